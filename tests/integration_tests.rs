// Integration tests - settings registry, commands, and persistence together

mod common;

use std::cell::Cell;
use std::rc::Rc;

use vimage::commands;
use vimage::config_io;
use vimage::settings::{default_registry, keys, AskQuestion, SettingValue};
use vimage::{CommandError, SettingsError};

struct CountingAsker {
    answer: bool,
    calls: Cell<usize>,
}

impl CountingAsker {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            calls: Cell::new(0),
        }
    }
}

impl AskQuestion for CountingAsker {
    fn ask_question(&self, _title: &str, _body: &str) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.answer
    }
}

/// Drive a setting through the command layer and observe the change
/// notification fire exactly once.
#[test]
fn test_command_set_notifies_subscribers_once() {
    common::tracing::init_tracing_from_env();
    let mut registry = default_registry().unwrap();

    let seen = Rc::new(Cell::new(0));
    let sink = Rc::clone(&seen);
    registry
        .get_mut(keys::thumbnail::SIZE)
        .unwrap()
        .subscribe(move |_| sink.set(sink.get() + 1));

    commands::run(&mut registry, "set thumbnail.size 256").unwrap();
    commands::run(&mut registry, "set thumbnail.size 256").unwrap();

    assert_eq!(seen.get(), 1);
    assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 256);
}

/// A full user session: change settings via commands, persist, restart,
/// reload.
#[test]
fn test_session_round_trip_through_config_file() {
    common::tracing::init_tracing_from_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vimage").join("settings.json");

    let mut registry = default_registry().unwrap();
    commands::run(&mut registry, "set library.width 0.5").unwrap();
    commands::run(&mut registry, "set sort.reverse!").unwrap();
    commands::run(&mut registry, "set image.autowrite false").unwrap();
    config_io::save(&registry, &path).unwrap();

    let mut restarted = default_registry().unwrap();
    config_io::load_into(&mut restarted, &path).unwrap();

    assert_eq!(restarted.float_value(keys::library::WIDTH).unwrap(), 0.5);
    assert!(restarted.bool_value(keys::sort::REVERSE).unwrap());
    let asker = CountingAsker::new(true);
    assert!(!restarted
        .get(keys::image::AUTOWRITE)
        .unwrap()
        .is_true(&asker)
        .unwrap());
    assert_eq!(asker.calls.get(), 0);
}

/// The autowrite prompt in its default ask state consults the injected
/// collaborator on every evaluation.
#[test]
fn test_autowrite_prompt_asks_every_time() {
    let registry = default_registry().unwrap();
    let asker = CountingAsker::new(true);
    let setting = registry.get(keys::image::AUTOWRITE).unwrap();
    assert!(setting.is_true(&asker).unwrap());
    assert!(setting.is_true(&asker).unwrap());
    assert_eq!(asker.calls.get(), 2);
}

/// Sorting respects the current values of the global flags, including
/// changes made after the order setting was created.
#[test]
fn test_sorting_tracks_global_flags() {
    let mut registry = default_registry().unwrap();
    let values: Vec<String> = ["b", "A", "a"].iter().map(|s| s.to_string()).collect();

    commands::run(&mut registry, "set sort.ignore_case true").unwrap();
    let sorted = registry.sort_values(keys::sort::IMAGE_ORDER, &values).unwrap();
    assert_eq!(sorted, vec!["A", "a", "b"]);

    commands::run(&mut registry, "set sort.reverse true").unwrap();
    let sorted = registry.sort_values(keys::sort::IMAGE_ORDER, &values).unwrap();
    assert_eq!(sorted, vec!["b", "A", "a"]);
}

/// Natural ordering through the registry: numbered files sort numerically.
#[test]
fn test_natural_order_via_command() {
    let mut registry = default_registry().unwrap();
    commands::run(&mut registry, "set sort.image_order natural").unwrap();
    let values: Vec<String> = ["img10.jpg", "img2.jpg", "img1.jpg"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let sorted = registry.sort_values(keys::sort::IMAGE_ORDER, &values).unwrap();
    assert_eq!(sorted, vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
}

/// reset-all restores the whole catalog after an arbitrary session.
#[test]
fn test_reset_all_restores_catalog_defaults() {
    let mut registry = default_registry().unwrap();
    commands::run(&mut registry, "set thumbnail.size 64").unwrap();
    commands::run(&mut registry, "set slideshow.delay 9.5").unwrap();
    commands::run(&mut registry, "set statusbar.show false").unwrap();
    commands::run(&mut registry, "reset-all").unwrap();

    assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 128);
    assert_eq!(registry.float_value(keys::slideshow::DELAY).unwrap(), 2.0);
    assert!(registry.bool_value(keys::statusbar::SHOW).unwrap());
}

/// Errors keep their identity through the command layer so the statusbar
/// can report them.
#[test]
fn test_error_surfaces_are_reportable() {
    let mut registry = default_registry().unwrap();

    let err = commands::run(&mut registry, "set thumbnail.size 100").unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot convert '100' to ThumbSize for setting 'thumbnail.size'"
    );

    let err = commands::run(&mut registry, "set no.such true").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Setting(SettingsError::NotFound { .. })
    ));

    let err = commands::run(&mut registry, "blargh").unwrap_err();
    assert_eq!(err.to_string(), "unknown command 'blargh'");
}

/// Completion: suggestions for the `:set` prompt come from non-hidden
/// registry entries plus the value suggestions of the selected setting.
#[test]
fn test_completion_suggestions() {
    let registry = default_registry().unwrap();

    let names = registry.suggest("sort.");
    assert!(names.contains(&keys::sort::IMAGE_ORDER.to_string()));
    assert!(names.contains(&keys::sort::REVERSE.to_string()));
    // Hidden settings stay out of the listing.
    assert!(!registry.suggest("st").contains(&"startup_library".to_string()));

    let values = registry.get(keys::sort::IMAGE_ORDER).unwrap().suggestions();
    assert_eq!(
        values,
        vec!["alphabetical", "natural", "none", "recently-modified", "size"]
    );

    let thumb = registry.get(keys::thumbnail::SIZE).unwrap().suggestions();
    assert_eq!(thumb, vec!["64", "128", "256", "512"]);
}

/// Stored values survive an out-of-range edit to the config file by
/// clamping on load rather than failing.
#[test]
fn test_config_file_out_of_range_values_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"library.width": "7.0", "keyhint.delay": "-200"}"#,
    )
    .unwrap();

    let mut registry = default_registry().unwrap();
    config_io::load_into(&mut registry, &path).unwrap();
    assert_eq!(registry.float_value(keys::library::WIDTH).unwrap(), 0.95);
    assert_eq!(registry.int_value(keys::keyhint::DELAY).unwrap(), 0);
}

/// Typed values are never stored as raw strings: a loaded config yields
/// semantic types.
#[test]
fn test_loaded_values_are_semantic_types() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"monitor_filesystem": "no"}"#).unwrap();

    let mut registry = default_registry().unwrap();
    config_io::load_into(&mut registry, &path).unwrap();
    assert_eq!(
        registry.get_value(keys::MONITOR_FILESYSTEM).unwrap(),
        SettingValue::Bool(false)
    );
}
