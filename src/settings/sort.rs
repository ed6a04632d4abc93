//! Ordering strategies for path-like strings.
//!
//! An Order setting selects one strategy out of a named table. Each strategy
//! maps a value to a [`SortKey`]; sorting compares the keys. The two textual
//! strategies (alphabetical, natural) can be made case-insensitive by
//! lowercasing their input before the key is computed.

use std::collections::BTreeMap;
use std::fmt;
use std::time::UNIX_EPOCH;

/// Totally ordered key produced by a strategy.
///
/// Keys are only compared within one strategy, so every strategy yields a
/// single variant and the cross-variant ordering of the derive is never
/// observable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// No ordering; leaves the input sequence as-is under a stable sort.
    Unit,
    /// Plain lexicographic text.
    Text(String),
    /// Numeric-aware chunked text, so "img2" sorts before "img10".
    Natural(Vec<NaturalChunk>),
    /// An unsigned magnitude such as a file size or a timestamp.
    Number(u128),
}

/// One run of digits or non-digits inside a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalChunk {
    Number(u128),
    Text(String),
}

/// Split text into alternating digit and non-digit runs for natural
/// comparison. Digit runs compare by numeric value, text runs
/// lexicographically.
pub fn natural_key(text: &str) -> Vec<NaturalChunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut in_digits = false;

    let flush = |buffer: &mut String, in_digits: bool, chunks: &mut Vec<NaturalChunk>| {
        if buffer.is_empty() {
            return;
        }
        let chunk = if in_digits {
            // Digit runs longer than u128 fall back to text comparison.
            buffer
                .parse()
                .map(NaturalChunk::Number)
                .unwrap_or_else(|_| NaturalChunk::Text(buffer.clone()))
        } else {
            NaturalChunk::Text(buffer.clone())
        };
        chunks.push(chunk);
        buffer.clear();
    };

    for ch in text.chars() {
        if ch.is_ascii_digit() != in_digits {
            flush(&mut buffer, in_digits, &mut chunks);
            in_digits = ch.is_ascii_digit();
        }
        buffer.push(ch);
    }
    flush(&mut buffer, in_digits, &mut chunks);
    chunks
}

/// Key function of one strategy.
pub type KeyFn = Box<dyn Fn(&str) -> SortKey>;

/// A named ordering strategy.
///
/// `textual` marks strategies whose key is computed from the string itself;
/// only those respect the global ignore-case flag.
pub struct Strategy {
    key: KeyFn,
    textual: bool,
}

impl Strategy {
    /// A strategy keyed on the string content, subject to ignore-case.
    pub fn textual(key: impl Fn(&str) -> SortKey + 'static) -> Self {
        Self {
            key: Box::new(key),
            textual: true,
        }
    }

    /// A strategy keyed on something other than the string content, e.g.
    /// file metadata.
    pub fn keyed(key: impl Fn(&str) -> SortKey + 'static) -> Self {
        Self {
            key: Box::new(key),
            textual: false,
        }
    }
}

/// Table of ordering strategies attached to one Order setting.
pub struct StrategyTable {
    strategies: BTreeMap<String, Strategy>,
}

impl fmt::Debug for StrategyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyTable")
            .field("strategies", &self.names())
            .finish()
    }
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StrategyTable {
    /// The four built-in strategies: alphabetical, natural,
    /// recently-modified, none.
    pub fn builtin() -> Self {
        let mut table = Self {
            strategies: BTreeMap::new(),
        };
        table.insert(
            "alphabetical",
            Strategy::textual(|s| SortKey::Text(s.to_string())),
        );
        table.insert("natural", Strategy::textual(|s| SortKey::Natural(natural_key(s))));
        table.insert("recently-modified", Strategy::keyed(|path| SortKey::Number(mtime(path))));
        table.insert("none", Strategy::keyed(|_| SortKey::Unit));
        table
    }

    /// Add or replace a named strategy.
    pub fn insert(&mut self, name: impl Into<String>, strategy: Strategy) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Builder-style [`Self::insert`] for catalog construction.
    pub fn with(mut self, name: impl Into<String>, strategy: Strategy) -> Self {
        self.insert(name, strategy);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.keys().cloned().collect()
    }

    /// Sort values under the named strategy.
    ///
    /// `ignore_case` lowercases input to textual strategies before keying;
    /// `reverse` inverts the comparison while keeping equal elements in
    /// their original order. Returns `None` if the strategy is unknown.
    pub fn sort(
        &self,
        strategy: &str,
        values: &[String],
        ignore_case: bool,
        reverse: bool,
    ) -> Option<Vec<String>> {
        let strategy = self.strategies.get(strategy)?;
        let mut keyed: Vec<(SortKey, String)> = values
            .iter()
            .map(|value| {
                let key = if strategy.textual && ignore_case {
                    (strategy.key)(&value.to_lowercase())
                } else {
                    (strategy.key)(value)
                };
                (key, value.clone())
            })
            .collect();
        if reverse {
            keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
        } else {
            keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        Some(keyed.into_iter().map(|(_, value)| value).collect())
    }
}

/// Modification time as nanoseconds since the epoch, 0 if unreadable.
fn mtime(path: &str) -> u128 {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_nanos())
        .unwrap_or(0)
}

/// File size in bytes, 0 if unreadable. Used by the image `size` strategy.
pub fn file_size(path: &str) -> u128 {
    std::fs::metadata(path).map(|meta| meta.len() as u128).unwrap_or(0)
}

/// Number of directory entries, 0 if unreadable. Used by the directory
/// `size` strategy.
pub fn entry_count(path: &str) -> u128 {
    std::fs::read_dir(path)
        .map(|entries| entries.count() as u128)
        .unwrap_or(0)
}
