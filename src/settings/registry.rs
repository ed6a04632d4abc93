//! Name-keyed store of settings.
//!
//! The registry is an explicit object handed by reference to whatever needs
//! lookup; there is no process-wide storage. Registration is a separate step
//! from construction, so tests can build small isolated registries.

use std::collections::BTreeMap;

use super::schema::keys;
use super::{Setting, SettingKind, SettingValue, SettingsError};

/// Store mapping setting names to [`Setting`] instances.
///
/// All mutation happens on the GUI's single event-processing thread; change
/// notifications are delivered in-line with the mutating call.
#[derive(Debug, Default)]
pub struct Registry {
    settings: BTreeMap<String, Setting>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setting under its name.
    ///
    /// Duplicate names are rejected rather than silently overwritten, so a
    /// catalog typo cannot shadow an existing setting.
    pub fn register(&mut self, setting: Setting) -> Result<(), SettingsError> {
        if self.settings.contains_key(setting.name()) {
            return Err(SettingsError::Duplicate {
                name: setting.name().to_string(),
            });
        }
        self.settings.insert(setting.name().to_string(), setting);
        Ok(())
    }

    /// Exact-match lookup.
    pub fn get(&self, name: &str) -> Result<&Setting, SettingsError> {
        self.settings.get(name).ok_or_else(|| SettingsError::NotFound {
            name: name.to_string(),
        })
    }

    /// Exact-match lookup for mutation.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Setting, SettingsError> {
        self.settings
            .get_mut(name)
            .ok_or_else(|| SettingsError::NotFound {
                name: name.to_string(),
            })
    }

    /// Current value of a setting.
    pub fn get_value(&self, name: &str) -> Result<SettingValue, SettingsError> {
        Ok(self.get(name)?.value().clone())
    }

    /// Set a setting from string input.
    pub fn set_str(&mut self, name: &str, text: &str) -> Result<(), SettingsError> {
        self.get_mut(name)?.set_str(text)
    }

    /// Reset every registered setting to its default. Settings are
    /// independent, so the order is unspecified.
    pub fn reset_all(&mut self) {
        for setting in self.settings.values_mut() {
            setting.reset();
        }
    }

    /// Iterate over all registered settings by name.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.settings.iter().map(|(name, setting)| (name.as_str(), setting))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Names of non-hidden settings matching a query, for the `:set`
    /// completion widget.
    ///
    /// Prefix matches come first; after those, names that contain the query
    /// characters in order (subsequence match). Both groups are
    /// alphabetical.
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        let mut prefixed = Vec::new();
        let mut fuzzy = Vec::new();
        for (name, setting) in self.items() {
            if setting.is_hidden() {
                continue;
            }
            if name.starts_with(&query) {
                prefixed.push(name.to_string());
            } else if is_subsequence(&query, name) {
                fuzzy.push(name.to_string());
            }
        }
        prefixed.extend(fuzzy);
        prefixed
    }

    fn bool_flag(&self, name: &str) -> bool {
        matches!(self.get_value(name), Ok(SettingValue::Bool(true)))
    }

    /// Typed accessor for Bool settings.
    pub fn bool_value(&self, name: &str) -> Result<bool, SettingsError> {
        match self.get_value(name)? {
            SettingValue::Bool(b) => Ok(b),
            _ => Err(self.wrong_kind(name, "Bool")),
        }
    }

    /// Typed accessor for Int and ThumbnailSize settings.
    pub fn int_value(&self, name: &str) -> Result<i64, SettingsError> {
        match self.get_value(name)? {
            SettingValue::Int(n) => Ok(n),
            _ => Err(self.wrong_kind(name, "Integer")),
        }
    }

    /// Typed accessor for Float settings.
    pub fn float_value(&self, name: &str) -> Result<f64, SettingsError> {
        match self.get_value(name)? {
            SettingValue::Float(n) => Ok(n),
            _ => Err(self.wrong_kind(name, "Float")),
        }
    }

    /// Typed accessor for Str and Order settings.
    pub fn str_value(&self, name: &str) -> Result<String, SettingsError> {
        match self.get_value(name)? {
            SettingValue::Str(s) => Ok(s),
            _ => Err(self.wrong_kind(name, "String")),
        }
    }

    /// Sort values under the strategy currently selected by an Order
    /// setting.
    ///
    /// The global `sort.ignore_case` and `sort.reverse` flags are read here,
    /// at sort time, so behavior always tracks their current values. In a
    /// registry without those flags they default to off.
    pub fn sort_values(
        &self,
        order_name: &str,
        values: &[String],
    ) -> Result<Vec<String>, SettingsError> {
        let setting = self.get(order_name)?;
        let (strategies, selected) = match (setting.kind(), setting.value()) {
            (SettingKind::Order { strategies }, SettingValue::Str(selected)) => {
                (strategies, selected)
            }
            _ => {
                return Err(SettingsError::WrongKind {
                    setting: order_name.to_string(),
                    expected: "Order",
                })
            }
        };
        let ignore_case = self.bool_flag(keys::sort::IGNORE_CASE);
        let reverse = self.bool_flag(keys::sort::REVERSE);
        // The selected strategy is validated on every set, so the table
        // always contains it.
        strategies
            .sort(selected, values, ignore_case, reverse)
            .ok_or_else(|| SettingsError::Conversion {
                value: selected.clone(),
                kind: "Order",
                setting: order_name.to_string(),
            })
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> SettingsError {
        SettingsError::WrongKind {
            setting: name.to_string(),
            expected,
        }
    }
}

/// True if every character of `query` appears in `candidate` in order.
fn is_subsequence(query: &str, candidate: &str) -> bool {
    let mut chars = query.chars().peekable();
    for ch in candidate.chars() {
        match chars.peek() {
            Some(&next) if next == ch => {
                chars.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    chars.peek().is_none()
}
