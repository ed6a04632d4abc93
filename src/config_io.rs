//! Loading and saving setting values.
//!
//! The config file is a flat JSON object mapping setting names to values in
//! their string form, the same text contract the `:set` command speaks.
//! Loading is forgiving: unknown names and bad values are logged and
//! skipped, so a stale config file from an older version never prevents
//! startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::Registry;

/// On-disk form of the settings file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredSettings(BTreeMap<String, serde_json::Value>);

/// Configuration I/O error types.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Default location of the user settings file
/// (`~/.config/vimage/settings.json`).
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vimage").join("settings.json"))
}

/// Apply stored values to a registry.
///
/// A missing file is not an error. Individual entries that fail to resolve
/// or convert are warned about and skipped; everything else is applied.
pub fn load_into(registry: &mut Registry, path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        tracing::debug!("No settings file at {}, using defaults", path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    let stored: StoredSettings = serde_json::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

    let mut applied = 0usize;
    for (name, value) in &stored.0 {
        let Some(text) = value_as_text(value) else {
            tracing::warn!(setting = %name, "skipping non-scalar value in settings file");
            continue;
        };
        match registry.set_str(name, &text) {
            Ok(()) => applied += 1,
            Err(err) => {
                tracing::warn!(setting = %name, %err, "skipping settings file entry");
            }
        }
    }
    tracing::info!(
        "Applied {} of {} entries from {}",
        applied,
        stored.0.len(),
        path.display()
    );
    Ok(())
}

/// Write every registered setting's current value in string form.
pub fn save(registry: &Registry, path: &Path) -> Result<(), ConfigError> {
    let stored = StoredSettings(
        registry
            .items()
            .map(|(name, setting)| {
                (
                    name.to_string(),
                    serde_json::Value::String(setting.display_value()),
                )
            })
            .collect(),
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", parent.display(), e)))?;
    }
    let json = serde_json::to_string_pretty(&stored)
        .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Render a JSON scalar as the string form `set_str` accepts.
fn value_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{default_registry, keys};

    #[test]
    fn test_load_missing_file_is_ok() {
        let mut registry = default_registry().unwrap();
        let dir = tempfile::tempdir().unwrap();
        load_into(&mut registry, &dir.path().join("settings.json")).unwrap();
        assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 128);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vimage").join("settings.json");

        let mut registry = default_registry().unwrap();
        registry.set_str(keys::thumbnail::SIZE, "512").unwrap();
        registry.set_str(keys::library::WIDTH, "0.4").unwrap();
        registry.set_str(keys::image::AUTOWRITE, "false").unwrap();
        save(&registry, &path).unwrap();

        let mut restored = default_registry().unwrap();
        load_into(&mut restored, &path).unwrap();
        assert_eq!(restored.int_value(keys::thumbnail::SIZE).unwrap(), 512);
        assert_eq!(restored.float_value(keys::library::WIDTH).unwrap(), 0.4);
        assert_eq!(
            restored.get_value(keys::image::AUTOWRITE).unwrap(),
            registry.get_value(keys::image::AUTOWRITE).unwrap()
        );
    }

    #[test]
    fn test_load_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "thumbnail.size": "100",
                "no.such.setting": "true",
                "library.width": ["not", "a", "scalar"],
                "read_only": true
            }"#,
        )
        .unwrap();

        let mut registry = default_registry().unwrap();
        load_into(&mut registry, &path).unwrap();
        // Bad entries are skipped, the good one lands.
        assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 128);
        assert_eq!(registry.float_value(keys::library::WIDTH).unwrap(), 0.3);
        assert!(registry.bool_value(keys::READ_ONLY).unwrap());
    }

    #[test]
    fn test_load_accepts_json_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"thumbnail.size": 256, "statusbar.show": false, "slideshow.delay": 3.5}"#,
        )
        .unwrap();

        let mut registry = default_registry().unwrap();
        load_into(&mut registry, &path).unwrap();
        assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 256);
        assert!(!registry.bool_value(keys::statusbar::SHOW).unwrap());
        assert_eq!(registry.float_value(keys::slideshow::DELAY).unwrap(), 3.5);
    }

    #[test]
    fn test_load_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let mut registry = default_registry().unwrap();
        let err = load_into(&mut registry, &path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
