//! Core library of the vimage modal image viewer.
//!
//! The GUI shell (windowing, rendering, keybinding dispatch) lives in the
//! application crate; this library holds the pieces it consumes:
//!
//! - [`settings`]: the typed settings registry with string conversion,
//!   clamping, and change notification,
//! - [`commands`]: the `:`-command parser and the settings-facing builtins,
//! - [`config_io`]: persistence of setting values to the user config file.

pub mod commands;
pub mod config_io;
pub mod settings;

pub use commands::{CommandError, ParsedCommand};
pub use config_io::ConfigError;
pub use settings::{
    AskQuestion, PromptAnswer, Registry, Setting, SettingKind, SettingValue, SettingsError,
};
