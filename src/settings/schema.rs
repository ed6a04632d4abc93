//! The application's setting catalog as declarative data.
//!
//! Each row is a [`SettingSpec`]; [`default_registry`] folds the rows into a
//! fresh [`Registry`]. Callers address settings through the constants in
//! [`keys`] rather than string literals.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::{
    sort, PromptAnswer, Registry, Setting, SettingKind, SettingValue, SettingsError, SortKey,
    Strategy, StrategyTable,
};

/// Names of all cataloged settings.
pub mod keys {
    pub const MONITOR_FILESYSTEM: &str = "monitor_filesystem";
    pub const STARTUP_LIBRARY: &str = "startup_library";
    pub const STYLE: &str = "style";
    pub const READ_ONLY: &str = "read_only";

    pub mod command {
        pub const HISTORY_LIMIT: &str = "command.history_limit";
    }

    pub mod completion {
        pub const FUZZY: &str = "completion.fuzzy";
    }

    pub mod search {
        pub const IGNORE_CASE: &str = "search.ignore_case";
        pub const INCREMENTAL: &str = "search.incremental";
    }

    pub mod image {
        pub const AUTOPLAY: &str = "image.autoplay";
        pub const AUTOWRITE: &str = "image.autowrite";
        pub const OVERZOOM: &str = "image.overzoom";
        pub const ZOOM_WHEEL_CTRL: &str = "image.zoom_wheel_ctrl";
    }

    pub mod library {
        pub const WIDTH: &str = "library.width";
        pub const SHOW_HIDDEN: &str = "library.show_hidden";
    }

    pub mod thumbnail {
        pub const SIZE: &str = "thumbnail.size";
        pub const SAVE: &str = "thumbnail.save";
    }

    pub mod slideshow {
        pub const DELAY: &str = "slideshow.delay";
        pub const INDICATOR: &str = "slideshow.indicator";
    }

    pub mod statusbar {
        pub const COLLAPSE_HOME: &str = "statusbar.collapse_home";
        pub const SHOW: &str = "statusbar.show";
        pub const MESSAGE_TIMEOUT: &str = "statusbar.message_timeout";
        pub const MARK_INDICATOR: &str = "statusbar.mark_indicator";
        pub const LEFT: &str = "statusbar.left";
        pub const LEFT_IMAGE: &str = "statusbar.left_image";
        pub const LEFT_THUMBNAIL: &str = "statusbar.left_thumbnail";
        pub const LEFT_MANIPULATE: &str = "statusbar.left_manipulate";
        pub const CENTER: &str = "statusbar.center";
        pub const CENTER_THUMBNAIL: &str = "statusbar.center_thumbnail";
        pub const RIGHT: &str = "statusbar.right";
        pub const RIGHT_IMAGE: &str = "statusbar.right_image";
    }

    pub mod keyhint {
        pub const DELAY: &str = "keyhint.delay";
        pub const TIMEOUT: &str = "keyhint.timeout";
    }

    pub mod title {
        pub const FALLBACK: &str = "title.fallback";
        pub const IMAGE: &str = "title.image";
    }

    pub mod metadata {
        pub const CURRENT_KEYSET: &str = "metadata.current_keyset";
    }

    pub mod sort {
        pub const IMAGE_ORDER: &str = "sort.image_order";
        pub const DIRECTORY_ORDER: &str = "sort.directory_order";
        pub const REVERSE: &str = "sort.reverse";
        pub const IGNORE_CASE: &str = "sort.ignore_case";
        pub const SHUFFLE: &str = "sort.shuffle";
    }
}

/// Default metadata keysets shown by the metadata widget, selectable by
/// index.
pub const METADATA_KEYSETS: [&str; 5] = [
    "Exif.Image.Make,Exif.Image.Model,Exif.Photo.LensModel,Exif.Image.DateTime,Exif.Image.Artist,Exif.Image.Copyright",
    "Exif.Photo.ExposureTime,Exif.Photo.FNumber,Exif.Photo.ISOSpeedRatings,Exif.Photo.ApertureValue,Exif.Photo.ExposureBiasValue,Exif.Photo.FocalLength,Exif.Photo.ExposureProgram",
    "Exif.GPSInfo.GPSLatitudeRef,Exif.GPSInfo.GPSLatitude,Exif.GPSInfo.GPSLongitudeRef,Exif.GPSInfo.GPSLongitude,Exif.GPSInfo.GPSAltitudeRef,Exif.GPSInfo.GPSAltitude",
    "Iptc.Application2.Caption,Iptc.Application2.Keywords,Iptc.Application2.City,Iptc.Application2.SubLocation,Iptc.Application2.ProvinceState,Iptc.Application2.CountryName,Iptc.Application2.Source,Iptc.Application2.Credit,Iptc.Application2.Copyright,Iptc.Application2.Contact",
    "Exif.Image.ImageWidth,Exif.Image.ImageLength,Exif.Photo.PixelXDimension,Exif.Photo.PixelYDimension,Exif.Image.BitsPerSample,Exif.Image.Compression,Exif.Photo.ColorSpace",
];

/// Metadata keysets numbered from 1 for the `:metadata` count argument.
pub static NUMBERED_KEYSETS: Lazy<BTreeMap<u32, &'static str>> = Lazy::new(|| {
    METADATA_KEYSETS
        .iter()
        .enumerate()
        .map(|(index, keyset)| (index as u32 + 1, *keyset))
        .collect()
});

/// One row of the setting catalog.
pub struct SettingSpec {
    pub name: &'static str,
    pub kind: SettingKind,
    pub default: SettingValue,
    pub desc: &'static str,
    pub suggestions: &'static [&'static str],
    pub hidden: bool,
}

impl SettingSpec {
    fn new(name: &'static str, kind: SettingKind, default: SettingValue) -> Self {
        Self {
            name,
            kind,
            default,
            desc: "",
            suggestions: &[],
            hidden: false,
        }
    }

    fn bool(name: &'static str, default: bool) -> Self {
        Self::new(name, SettingKind::Bool, SettingValue::Bool(default))
    }

    fn str(name: &'static str, default: &str) -> Self {
        Self::new(name, SettingKind::Str, SettingValue::Str(default.to_string()))
    }

    fn int(name: &'static str, default: i64, min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(name, SettingKind::Int { min, max }, SettingValue::Int(default))
    }

    fn float(name: &'static str, default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(
            name,
            SettingKind::Float { min, max },
            SettingValue::Float(default),
        )
    }

    fn prompt(name: &'static str, default: PromptAnswer, title: &str, body: &str) -> Self {
        Self::new(
            name,
            SettingKind::Prompt {
                title: title.to_string(),
                body: body.to_string(),
            },
            SettingValue::Prompt(default),
        )
    }

    fn order(name: &'static str, default: &str, strategies: StrategyTable) -> Self {
        Self::new(
            name,
            SettingKind::Order { strategies },
            SettingValue::Str(default.to_string()),
        )
    }

    fn desc(mut self, desc: &'static str) -> Self {
        self.desc = desc;
        self
    }

    fn suggestions(mut self, suggestions: &'static [&'static str]) -> Self {
        self.suggestions = suggestions;
        self
    }

    fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Build the setting this row describes.
    pub fn build(self) -> Result<Setting, SettingsError> {
        let mut setting = Setting::new(self.name, self.kind, self.default)?
            .with_desc(self.desc)
            .with_suggestions(self.suggestions.iter().copied());
        if self.hidden {
            setting = setting.hidden();
        }
        Ok(setting)
    }
}

/// The full catalog of application settings.
pub fn default_catalog() -> Vec<SettingSpec> {
    vec![
        SettingSpec::bool(keys::MONITOR_FILESYSTEM, true)
            .desc("Monitor current directory for changes and reload widgets automatically"),
        SettingSpec::bool(keys::STARTUP_LIBRARY, true)
            .desc("Enter library at startup if there are no images to show")
            .hidden(),
        SettingSpec::str(keys::STYLE, "default").hidden(),
        SettingSpec::bool(keys::READ_ONLY, false)
            .desc("Disable any commands that are able to edit files on disk"),
        SettingSpec::int(keys::command::HISTORY_LIMIT, 100, None, None)
            .desc("Maximum number of commands to store in history")
            .hidden(),
        SettingSpec::bool(keys::completion::FUZZY, false)
            .desc("Use fuzzy matching in completion"),
        SettingSpec::bool(keys::search::IGNORE_CASE, true)
            .desc("Ignore case when searching, i.e. 'A' and 'a' are equal"),
        SettingSpec::bool(keys::search::INCREMENTAL, true)
            .desc("Automatically filter search results when typing"),
        SettingSpec::bool(keys::image::AUTOPLAY, true)
            .desc("Start playing animations on open"),
        SettingSpec::prompt(
            keys::image::AUTOWRITE,
            PromptAnswer::Ask,
            "Image edited",
            "Do you want to write your changes to disk?",
        )
        .desc("Save images on changes"),
        SettingSpec::float(keys::image::OVERZOOM, 1.0, Some(1.0), None)
            .desc("Maximum scale to apply trying to fit image to window")
            .suggestions(&["1.0", "1.5", "2.0", "5.0"]),
        SettingSpec::bool(keys::image::ZOOM_WHEEL_CTRL, true)
            .desc("Require holding the control modifier for zooming with the mouse wheel"),
        SettingSpec::float(keys::library::WIDTH, 0.3, Some(0.05), Some(0.95))
            .desc("Width of the library as fraction of main window size")
            .suggestions(&["0.2", "0.3", "0.4", "0.5"]),
        SettingSpec::bool(keys::library::SHOW_HIDDEN, false)
            .desc("Show hidden files in the library"),
        SettingSpec::new(
            keys::thumbnail::SIZE,
            SettingKind::ThumbnailSize,
            SettingValue::Int(128),
        )
        .desc("Size of thumbnails"),
        SettingSpec::bool(keys::thumbnail::SAVE, true)
            .desc("Save new thumbnails to disk in the shared icon cache for later use"),
        SettingSpec::float(keys::slideshow::DELAY, 2.0, Some(0.5), None)
            .desc("Delay to next image in slideshow"),
        SettingSpec::str(keys::slideshow::INDICATOR, "slideshow:")
            .desc("Text to display in statusbar when slideshow is running"),
        SettingSpec::bool(keys::statusbar::COLLAPSE_HOME, true)
            .desc("Collapse /home/user to ~ in statusbar"),
        SettingSpec::bool(keys::statusbar::SHOW, true).desc("Always display the statusbar"),
        SettingSpec::int(keys::statusbar::MESSAGE_TIMEOUT, 60000, Some(500), None)
            .desc("Time in ms until statusbar messages are removed"),
        SettingSpec::str(keys::statusbar::MARK_INDICATOR, "<b>*</b>")
            .desc("Text to display if the current image is marked"),
        // Statusbar module strings, retrieved by name only.
        SettingSpec::str(keys::statusbar::LEFT, "{pwd}{read-only}"),
        SettingSpec::str(
            keys::statusbar::LEFT_IMAGE,
            "{index}/{total} {basename}{read-only} [{zoomlevel}]",
        ),
        SettingSpec::str(
            keys::statusbar::LEFT_THUMBNAIL,
            "{thumbnail-index}/{thumbnail-total} {thumbnail-basename}{read-only}",
        ),
        SettingSpec::str(
            keys::statusbar::LEFT_MANIPULATE,
            "{basename}   {image-size}   Modified: {modified}   {processing}",
        ),
        SettingSpec::str(
            keys::statusbar::CENTER,
            "{slideshow-indicator} {slideshow-delay} {transformation-info}",
        ),
        SettingSpec::str(keys::statusbar::CENTER_THUMBNAIL, "{thumbnail-size}"),
        SettingSpec::str(keys::statusbar::RIGHT, "{keys}  {mark-count}  {mode}"),
        SettingSpec::str(
            keys::statusbar::RIGHT_IMAGE,
            "{keys}  {mark-indicator} {mark-count}  {mode}",
        ),
        SettingSpec::int(keys::keyhint::DELAY, 500, Some(0), None)
            .desc("Delay (in ms) until the keyhint widget is displayed"),
        SettingSpec::int(keys::keyhint::TIMEOUT, 5000, Some(100), None)
            .desc("Time (in ms) after which partially typed keybindings are cleared"),
        SettingSpec::str(keys::title::FALLBACK, "vimage")
            .desc("Default window title if no mode specific options exist"),
        SettingSpec::str(keys::title::IMAGE, "vimage - {basename}")
            .desc("Window title in image mode"),
        SettingSpec::str(keys::metadata::CURRENT_KEYSET, METADATA_KEYSETS[0])
            .desc("Currently displayed metadata keyset")
            .suggestions(&METADATA_KEYSETS),
        SettingSpec::order(
            keys::sort::IMAGE_ORDER,
            "alphabetical",
            StrategyTable::builtin().with(
                "size",
                Strategy::keyed(|path| SortKey::Number(sort::file_size(path))),
            ),
        )
        .desc("Ordering of images, e.g. in the library"),
        SettingSpec::order(
            keys::sort::DIRECTORY_ORDER,
            "alphabetical",
            StrategyTable::builtin().with(
                "size",
                Strategy::keyed(|path| SortKey::Number(sort::entry_count(path))),
            ),
        )
        .desc("Ordering of directories, e.g. in the library"),
        SettingSpec::bool(keys::sort::REVERSE, false)
            .desc("Reverse the order of sorting, i.e. z before a, largest first, etc."),
        SettingSpec::bool(keys::sort::IGNORE_CASE, false)
            .desc("Ignore case when sorting, i.e. 'A' and 'a' are equal"),
        SettingSpec::bool(keys::sort::SHUFFLE, false)
            .desc("Randomly shuffle images and ignoring all other sort settings"),
    ]
}

/// Build a registry populated with the default catalog.
pub fn default_registry() -> Result<Registry, SettingsError> {
    let mut registry = Registry::new();
    for spec in default_catalog() {
        registry.register(spec.build()?)?;
    }
    Ok(registry)
}
