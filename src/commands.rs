//! Parsing and dispatch for `:`-style commands.
//!
//! Command text is split into an optional count, a command name, and
//! shell-style arguments. The builtins implemented here are the ones that
//! drive the settings registry; navigation and image commands live with
//! their widgets in the GUI shell and go through the same parser.

use std::fmt;

use crate::settings::{Registry, SettingKind, SettingsError};

/// A command line split into its parts.
///
/// Digits prepending the command name are stripped off as a count, e.g.
/// `"2next"` parses as count 2, name `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub count: Option<usize>,
    pub name: String,
    pub args: Vec<String>,
}

/// Errors surfaced when parsing or running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Empty input, or input that is only a count.
    Empty,
    /// No command under this name.
    NotFound(String),
    /// The command exists but its arguments are unusable.
    Argument(String),
    /// A quote was opened and never closed.
    UnterminatedQuote,
    /// A settings operation failed.
    Setting(SettingsError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "no command given"),
            CommandError::NotFound(name) => write!(f, "unknown command '{name}'"),
            CommandError::Argument(msg) => write!(f, "{msg}"),
            CommandError::UnterminatedQuote => write!(f, "unterminated quote"),
            CommandError::Setting(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Setting(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        CommandError::Setting(err)
    }
}

/// Split command text into count, name, and arguments.
pub fn parse(text: &str) -> Result<ParsedCommand, CommandError> {
    let words = split_args(text.trim())?;
    let mut words = words.into_iter();
    let first = words.next().ok_or(CommandError::Empty)?;

    let digits: String = first.chars().take_while(|c| c.is_ascii_digit()).collect();
    let name = first[digits.len()..].to_string();
    if name.is_empty() {
        return Err(CommandError::Empty);
    }
    let count = if digits.is_empty() {
        None
    } else {
        // Counts longer than usize are nonsense input; saturate.
        Some(digits.parse().unwrap_or(usize::MAX))
    };

    Ok(ParsedCommand {
        count,
        name,
        args: words.collect(),
    })
}

/// Split text into words, honoring single quotes, double quotes, and
/// backslash escapes.
fn split_args(text: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_word = true;
                }
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| CommandError::Argument("trailing backslash".to_string()))?;
                    current.push(escaped);
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }
    if quote.is_some() {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Run a settings-facing command against the registry.
pub fn run(registry: &mut Registry, text: &str) -> Result<(), CommandError> {
    let parsed = parse(text)?;
    match parsed.name.as_str() {
        "set" => set(registry, &parsed.args),
        "toggle" => toggle(registry, &parsed.args),
        "reset" => reset(registry, &parsed.args),
        "reset-all" => {
            registry.reset_all();
            Ok(())
        }
        other => Err(CommandError::NotFound(other.to_string())),
    }
}

/// `:set <name> [value]`
///
/// A trailing `!` on the name toggles a boolean; a missing value does the
/// same. Remaining arguments are joined with spaces so unquoted format
/// strings survive.
fn set(registry: &mut Registry, args: &[String]) -> Result<(), CommandError> {
    let name = args
        .first()
        .ok_or_else(|| CommandError::Argument("set requires a setting name".to_string()))?;

    if let Some(name) = name.strip_suffix('!') {
        if args.len() > 1 {
            return Err(CommandError::Argument(
                "cannot combine '!' with a value".to_string(),
            ));
        }
        return Ok(registry.get_mut(name)?.toggle()?);
    }

    if args.len() == 1 {
        let setting = registry.get_mut(name)?;
        if matches!(setting.kind(), SettingKind::Bool) {
            return Ok(setting.toggle()?);
        }
        return Err(CommandError::Argument(format!(
            "set requires a value for '{name}'"
        )));
    }

    let value = args[1..].join(" ");
    Ok(registry.set_str(name, &value)?)
}

/// `:toggle <name>`
fn toggle(registry: &mut Registry, args: &[String]) -> Result<(), CommandError> {
    let name = expect_single(args, "toggle")?;
    Ok(registry.get_mut(name)?.toggle()?)
}

/// `:reset <name>`
fn reset(registry: &mut Registry, args: &[String]) -> Result<(), CommandError> {
    let name = expect_single(args, "reset")?;
    registry.get_mut(name)?.reset();
    Ok(())
}

fn expect_single<'a>(args: &'a [String], command: &str) -> Result<&'a str, CommandError> {
    match args {
        [name] => Ok(name),
        [] => Err(CommandError::Argument(format!(
            "{command} requires a setting name"
        ))),
        _ => Err(CommandError::Argument(format!(
            "{command} takes exactly one argument"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{keys, default_registry};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_plain_command() {
        let parsed = parse("next").unwrap();
        assert_eq!(
            parsed,
            ParsedCommand {
                count: None,
                name: "next".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parse_count_prefix() {
        let parsed = parse("2next").unwrap();
        assert_eq!(parsed.count, Some(2));
        assert_eq!(parsed.name, "next");

        let parsed = parse("03goto top").unwrap();
        assert_eq!(parsed.count, Some(3));
        assert_eq!(parsed.name, "goto");
        assert_eq!(parsed.args, args(&["top"]));
    }

    #[test]
    fn test_parse_quoted_arguments() {
        let parsed = parse(r#"set title.image "vimage - {basename}""#).unwrap();
        assert_eq!(parsed.args, args(&["title.image", "vimage - {basename}"]));

        let parsed = parse("set style 'my theme'").unwrap();
        assert_eq!(parsed.args, args(&["style", "my theme"]));
    }

    #[test]
    fn test_parse_backslash_escape() {
        let parsed = parse(r"echo a\ b").unwrap();
        assert_eq!(parsed.args, args(&["a b"]));
    }

    #[test]
    fn test_parse_empty_and_count_only() {
        assert_eq!(parse("").unwrap_err(), CommandError::Empty);
        assert_eq!(parse("   ").unwrap_err(), CommandError::Empty);
        assert_eq!(parse("42").unwrap_err(), CommandError::Empty);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        assert_eq!(
            parse("set style 'oops").unwrap_err(),
            CommandError::UnterminatedQuote
        );
    }

    #[test]
    fn test_set_command() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "set thumbnail.size 256").unwrap();
        assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 256);
    }

    #[test]
    fn test_set_joins_unquoted_value() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "set slideshow.indicator playing now").unwrap();
        assert_eq!(
            registry.str_value(keys::slideshow::INDICATOR).unwrap(),
            "playing now"
        );
    }

    #[test]
    fn test_set_bang_toggles_bool() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "set statusbar.show!").unwrap();
        assert!(!registry.bool_value(keys::statusbar::SHOW).unwrap());
        run(&mut registry, "set statusbar.show!").unwrap();
        assert!(registry.bool_value(keys::statusbar::SHOW).unwrap());
    }

    #[test]
    fn test_set_without_value_toggles_bool_only() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "set read_only").unwrap();
        assert!(registry.bool_value(keys::READ_ONLY).unwrap());

        let err = run(&mut registry, "set thumbnail.size").unwrap_err();
        assert!(matches!(err, CommandError::Argument(_)));
    }

    #[test]
    fn test_set_conversion_error_propagates() {
        let mut registry = default_registry().unwrap();
        let err = run(&mut registry, "set thumbnail.size 100").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Setting(SettingsError::Conversion { .. })
        ));
    }

    #[test]
    fn test_set_unknown_setting() {
        let mut registry = default_registry().unwrap();
        let err = run(&mut registry, "set no.such.setting true").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Setting(SettingsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_toggle_and_reset_commands() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "toggle completion.fuzzy").unwrap();
        assert!(registry.bool_value(keys::completion::FUZZY).unwrap());

        run(&mut registry, "set library.width 0.5").unwrap();
        run(&mut registry, "reset library.width").unwrap();
        assert_eq!(registry.float_value(keys::library::WIDTH).unwrap(), 0.3);
    }

    #[test]
    fn test_reset_all_command() {
        let mut registry = default_registry().unwrap();
        run(&mut registry, "set thumbnail.size 512").unwrap();
        run(&mut registry, "set read_only true").unwrap();
        run(&mut registry, "reset-all").unwrap();
        assert_eq!(registry.int_value(keys::thumbnail::SIZE).unwrap(), 128);
        assert!(!registry.bool_value(keys::READ_ONLY).unwrap());
    }

    #[test]
    fn test_unknown_command() {
        let mut registry = default_registry().unwrap();
        assert_eq!(
            run(&mut registry, "frobnicate").unwrap_err(),
            CommandError::NotFound("frobnicate".to_string())
        );
    }
}
