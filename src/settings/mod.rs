//! Typed settings with string conversion, clamping, and change notification.
//!
//! Every user-visible knob in vimage is a [`Setting`]: a named, typed value
//! with a default, an optional description, and a list of subscribers that are
//! notified synchronously when the value changes. Settings are driven from two
//! directions: typed access from widgets, and string input from the command
//! line and the config file. Both funnel through the kind-specific conversion
//! rules so the stored value is always a valid instance of the setting's type,
//! never a raw string.

pub mod registry;
pub mod schema;
pub mod sort;

pub use registry::Registry;
pub use schema::{default_catalog, default_registry, keys, SettingSpec};
pub use sort::{SortKey, Strategy, StrategyTable};

use std::fmt;

/// Discrete sizes supported by the thumbnail grid.
pub const THUMBNAIL_SIZES: [i64; 4] = [64, 128, 256, 512];

/// Answer state of a [`SettingKind::Prompt`] setting.
///
/// `Ask` defers the decision to the user: every time the setting's boolean
/// state is evaluated, the injected [`AskQuestion`] collaborator is consulted
/// again. The answer is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    True,
    False,
    Ask,
}

impl fmt::Display for PromptAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptAnswer::True => write!(f, "true"),
            PromptAnswer::False => write!(f, "false"),
            PromptAnswer::Ask => write!(f, "ask"),
        }
    }
}

/// Interactive yes/no confirmation, injected by the GUI shell.
///
/// The core never talks to the window system directly; the one place a
/// setting needs user interaction (a [`PromptAnswer::Ask`] prompt) goes
/// through this trait. The call blocks the evaluating flow until answered,
/// so it must not be entered from a context that cannot tolerate a nested
/// wait.
pub trait AskQuestion {
    fn ask_question(&self, title: &str, body: &str) -> bool;
}

/// A setting's current or default value in its semantic type.
///
/// ThumbnailSize settings store `Int`, Order settings store `Str`; the kind
/// carries the extra validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Prompt(PromptAnswer),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Prompt(p) => write!(f, "{p}"),
            SettingValue::Int(n) => write!(f, "{n}"),
            SettingValue::Float(n) => write!(f, "{n}"),
            SettingValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A native number passed to the arithmetic helpers on numeric settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

/// The closed set of setting types and their validation data.
pub enum SettingKind {
    Bool,
    /// Tri-state boolean whose `ask` state triggers an interactive
    /// confirmation with the given title and body.
    Prompt { title: String, body: String },
    /// Integer clamped into `[min, max]` where bounds are set.
    Int { min: Option<i64>, max: Option<i64> },
    /// Float clamped into `[min, max]` where bounds are set.
    Float { min: Option<f64>, max: Option<f64> },
    /// Integer restricted to [`THUMBNAIL_SIZES`].
    ThumbnailSize,
    Str,
    /// Name of a sort strategy in the attached table.
    Order { strategies: StrategyTable },
}

impl SettingKind {
    /// Human-readable type name, used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingKind::Bool => "Bool",
            SettingKind::Prompt { .. } => "Prompt",
            SettingKind::Int { .. } => "Integer",
            SettingKind::Float { .. } => "Float",
            SettingKind::ThumbnailSize => "ThumbSize",
            SettingKind::Str => "String",
            SettingKind::Order { .. } => "Order",
        }
    }

    /// Parse string input into a value of this kind, applying clamping and
    /// validation. `None` means the text is not convertible.
    fn parse(&self, text: &str) -> Option<SettingValue> {
        match self {
            SettingKind::Bool => parse_bool(text).map(SettingValue::Bool),
            SettingKind::Prompt { .. } => {
                let answer = match text.to_lowercase().as_str() {
                    "yes" | "true" | "1" => PromptAnswer::True,
                    "no" | "false" | "0" => PromptAnswer::False,
                    "ask" => PromptAnswer::Ask,
                    _ => return None,
                };
                Some(SettingValue::Prompt(answer))
            }
            SettingKind::Int { min, max } => {
                let n: i64 = text.parse().ok()?;
                Some(SettingValue::Int(clamp_i64(n, *min, *max)))
            }
            SettingKind::Float { min, max } => {
                let n: f64 = text.parse().ok()?;
                Some(SettingValue::Float(clamp_f64(n, *min, *max)))
            }
            SettingKind::ThumbnailSize => {
                let n: i64 = text.parse().ok()?;
                THUMBNAIL_SIZES.contains(&n).then_some(SettingValue::Int(n))
            }
            SettingKind::Str => Some(SettingValue::Str(text.to_string())),
            SettingKind::Order { strategies } => strategies
                .contains(text)
                .then(|| SettingValue::Str(text.to_string())),
        }
    }

    /// Coerce a native value into this kind, applying the same clamping and
    /// validation as the string path. Numeric kinds accept both `Int` and
    /// `Float` input.
    fn coerce(&self, value: SettingValue) -> Option<SettingValue> {
        match (self, value) {
            (SettingKind::Bool, SettingValue::Bool(b)) => Some(SettingValue::Bool(b)),
            (SettingKind::Prompt { .. }, SettingValue::Prompt(p)) => {
                Some(SettingValue::Prompt(p))
            }
            (SettingKind::Int { min, max }, v) => {
                let n = as_i64(&v)?;
                Some(SettingValue::Int(clamp_i64(n, *min, *max)))
            }
            (SettingKind::Float { min, max }, v) => {
                let n = as_f64(&v)?;
                Some(SettingValue::Float(clamp_f64(n, *min, *max)))
            }
            (SettingKind::ThumbnailSize, v) => {
                let n = as_i64(&v)?;
                THUMBNAIL_SIZES.contains(&n).then_some(SettingValue::Int(n))
            }
            (SettingKind::Str, SettingValue::Str(s)) => Some(SettingValue::Str(s)),
            (SettingKind::Order { strategies }, SettingValue::Str(s)) => {
                strategies.contains(&s).then_some(SettingValue::Str(s))
            }
            _ => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn as_i64(value: &SettingValue) -> Option<i64> {
    match value {
        SettingValue::Int(n) => Some(*n),
        SettingValue::Float(n) => Some(*n as i64),
        _ => None,
    }
}

fn as_f64(value: &SettingValue) -> Option<f64> {
    match value {
        SettingValue::Int(n) => Some(*n as f64),
        SettingValue::Float(n) => Some(*n),
        _ => None,
    }
}

fn clamp_i64(v: i64, min: Option<i64>, max: Option<i64>) -> i64 {
    let v = min.map_or(v, |m| v.max(m));
    max.map_or(v, |m| v.min(m))
}

fn clamp_f64(v: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let v = min.map_or(v, |m| v.max(m));
    max.map_or(v, |m| v.min(m))
}

/// Errors surfaced by settings operations.
///
/// All failures are deterministic functions of the input; nothing here is
/// retried or swallowed internally. Callers (command handlers, the config
/// loader) are responsible for user-facing reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Input could not be converted or validated for the target kind.
    Conversion {
        value: String,
        kind: &'static str,
        setting: String,
    },
    /// Lookup by name failed.
    NotFound { name: String },
    /// A second setting was registered under an existing name.
    Duplicate { name: String },
    /// An operation was called on a setting of the wrong kind, e.g. `toggle`
    /// on an integer.
    WrongKind {
        setting: String,
        expected: &'static str,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Conversion {
                value,
                kind,
                setting,
            } => write!(f, "cannot convert '{value}' to {kind} for setting '{setting}'"),
            SettingsError::NotFound { name } => write!(f, "no setting named '{name}'"),
            SettingsError::Duplicate { name } => {
                write!(f, "setting '{name}' is already registered")
            }
            SettingsError::WrongKind { setting, expected } => {
                write!(f, "setting '{setting}' is not of kind {expected}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Callback invoked with the new value after a setting changed.
pub type ChangeObserver = Box<dyn FnMut(&SettingValue)>;

/// A named, typed, mutable configuration value.
///
/// Construction validates the default against the kind, so `reset` can never
/// fail afterwards. Registration in a [`Registry`] is a separate, explicit
/// step.
pub struct Setting {
    name: String,
    desc: String,
    hidden: bool,
    kind: SettingKind,
    default: SettingValue,
    value: SettingValue,
    suggestions: Vec<String>,
    observers: Vec<ChangeObserver>,
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("kind", &self.kind.type_name())
            .field("value", &self.value)
            .field("default", &self.default)
            .field("hidden", &self.hidden)
            .finish()
    }
}

impl Setting {
    /// Create a setting, validating the default against the kind.
    pub fn new(
        name: impl Into<String>,
        kind: SettingKind,
        default: SettingValue,
    ) -> Result<Self, SettingsError> {
        let name = name.into();
        let default = kind.coerce(default.clone()).ok_or_else(|| {
            SettingsError::Conversion {
                value: default.to_string(),
                kind: kind.type_name(),
                setting: name.clone(),
            }
        })?;
        Ok(Self {
            name,
            desc: String::new(),
            hidden: false,
            kind,
            value: default.clone(),
            default,
            suggestions: Vec::new(),
            observers: Vec::new(),
        })
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Exclude this setting from interactive listings. It stays addressable
    /// by name and is still persisted.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_suggestions<S: Into<String>>(mut self, suggestions: impl IntoIterator<Item = S>) -> Self {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    pub fn default(&self) -> &SettingValue {
        &self.default
    }

    /// Current value in its string form, as accepted back by [`Self::set_str`].
    pub fn display_value(&self) -> String {
        self.value.to_string()
    }

    /// Subscribe to value changes. Observers run synchronously, in
    /// subscription order, on the same flow that performed the mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&SettingValue) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Set from a native value, converting and clamping per the kind.
    pub fn set(&mut self, value: SettingValue) -> Result<(), SettingsError> {
        let converted = self
            .kind
            .coerce(value.clone())
            .ok_or_else(|| self.conversion_error(value.to_string()))?;
        self.assign(converted);
        Ok(())
    }

    /// Set from string input, the sole text-serialization contract.
    pub fn set_str(&mut self, text: &str) -> Result<(), SettingsError> {
        let converted = self
            .kind
            .parse(text)
            .ok_or_else(|| self.conversion_error(text.to_string()))?;
        self.assign(converted);
        Ok(())
    }

    /// Restore the value supplied at construction.
    pub fn reset(&mut self) {
        // The default was validated in `new`, so this cannot fail.
        self.assign(self.default.clone());
    }

    /// Suggested string values for interactive completion.
    ///
    /// An explicit list supplied at construction wins; otherwise the kind
    /// provides its full value set where that set is finite.
    pub fn suggestions(&self) -> Vec<String> {
        if !self.suggestions.is_empty() {
            return self.suggestions.clone();
        }
        match &self.kind {
            SettingKind::Bool => vec!["true".into(), "false".into()],
            SettingKind::Prompt { .. } => {
                vec!["true".into(), "false".into(), "ask".into()]
            }
            SettingKind::ThumbnailSize => {
                THUMBNAIL_SIZES.iter().map(|n| n.to_string()).collect()
            }
            SettingKind::Order { strategies } => strategies.names(),
            SettingKind::Int { .. } | SettingKind::Float { .. } | SettingKind::Str => {
                Vec::new()
            }
        }
    }

    /// Boolean state of a Bool or Prompt setting.
    ///
    /// A Prompt in the `ask` state consults the collaborator on every call;
    /// `false` short-circuits without asking.
    pub fn is_true(&self, asker: &dyn AskQuestion) -> Result<bool, SettingsError> {
        match (&self.kind, &self.value) {
            (SettingKind::Bool, SettingValue::Bool(b)) => Ok(*b),
            (SettingKind::Prompt { title, body }, SettingValue::Prompt(answer)) => {
                Ok(match answer {
                    PromptAnswer::True => true,
                    PromptAnswer::False => false,
                    PromptAnswer::Ask => asker.ask_question(title, body),
                })
            }
            _ => Err(SettingsError::WrongKind {
                setting: self.name.clone(),
                expected: "Bool or Prompt",
            }),
        }
    }

    /// Flip a Bool setting.
    pub fn toggle(&mut self) -> Result<(), SettingsError> {
        let current = match (&self.kind, &self.value) {
            (SettingKind::Bool, SettingValue::Bool(b)) => *b,
            _ => {
                return Err(SettingsError::WrongKind {
                    setting: self.name.clone(),
                    expected: "Bool",
                })
            }
        };
        self.assign(SettingValue::Bool(!current));
        Ok(())
    }

    /// Add to a numeric setting's current value.
    pub fn add(&mut self, amount: impl Into<Number>) -> Result<(), SettingsError> {
        self.combine(amount.into(), Combine::Add)
    }

    /// Add a string-form amount to a numeric setting's current value.
    pub fn add_str(&mut self, text: &str) -> Result<(), SettingsError> {
        let amount = self.parse_amount(text)?;
        self.combine(amount, Combine::Add)
    }

    /// Multiply a numeric setting's current value.
    pub fn multiply(&mut self, amount: impl Into<Number>) -> Result<(), SettingsError> {
        self.combine(amount.into(), Combine::Multiply)
    }

    /// Multiply by a string-form amount.
    pub fn multiply_str(&mut self, text: &str) -> Result<(), SettingsError> {
        let amount = self.parse_amount(text)?;
        self.combine(amount, Combine::Multiply)
    }

    /// Move a ThumbnailSize setting one slot up or down, clamped at the ends.
    pub fn step(&mut self, up: bool) -> Result<(), SettingsError> {
        let next = match (&self.kind, &self.value) {
            (SettingKind::ThumbnailSize, SettingValue::Int(current)) => {
                // The stored value is always a member of THUMBNAIL_SIZES.
                let index = THUMBNAIL_SIZES
                    .iter()
                    .position(|size| size == current)
                    .unwrap_or(0);
                let index = if up {
                    (index + 1).min(THUMBNAIL_SIZES.len() - 1)
                } else {
                    index.saturating_sub(1)
                };
                THUMBNAIL_SIZES[index]
            }
            _ => {
                return Err(SettingsError::WrongKind {
                    setting: self.name.clone(),
                    expected: "ThumbSize",
                })
            }
        };
        self.assign(SettingValue::Int(next));
        Ok(())
    }

    /// Parse an arithmetic amount with the *unclamped* base rule, so bounds
    /// apply once, to the combined result, not to the operand.
    fn parse_amount(&self, text: &str) -> Result<Number, SettingsError> {
        match &self.kind {
            SettingKind::Int { .. } => text
                .parse::<i64>()
                .map(Number::Int)
                .map_err(|_| self.conversion_error(text.to_string())),
            SettingKind::Float { .. } => text
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| self.conversion_error(text.to_string())),
            _ => Err(SettingsError::WrongKind {
                setting: self.name.clone(),
                expected: "Integer or Float",
            }),
        }
    }

    fn combine(&mut self, amount: Number, op: Combine) -> Result<(), SettingsError> {
        let combined = match (&self.kind, &self.value) {
            (SettingKind::Int { .. }, SettingValue::Int(current)) => {
                let amount = match amount {
                    Number::Int(n) => n,
                    Number::Float(n) => n as i64,
                };
                SettingValue::Int(match op {
                    Combine::Add => current.saturating_add(amount),
                    Combine::Multiply => current.saturating_mul(amount),
                })
            }
            (SettingKind::Float { .. }, SettingValue::Float(current)) => {
                let amount = match amount {
                    Number::Int(n) => n as f64,
                    Number::Float(n) => n,
                };
                SettingValue::Float(match op {
                    Combine::Add => current + amount,
                    Combine::Multiply => current * amount,
                })
            }
            _ => {
                return Err(SettingsError::WrongKind {
                    setting: self.name.clone(),
                    expected: "Integer or Float",
                })
            }
        };
        self.set(combined)
    }

    /// Store a converted value and notify observers if it differs from the
    /// current one. Identical values are a silent no-op.
    fn assign(&mut self, value: SettingValue) {
        if value == self.value {
            return;
        }
        self.value = value;
        tracing::debug!(setting = %self.name, value = %self.value, "setting changed");
        for observer in &mut self.observers {
            observer(&self.value);
        }
    }

    fn conversion_error(&self, value: String) -> SettingsError {
        SettingsError::Conversion {
            value,
            kind: self.kind.type_name(),
            setting: self.name.clone(),
        }
    }
}

enum Combine {
    Add,
    Multiply,
}
