//! Flat configuration records for behavior factories.
//!
//! Effect and condition factories receive a `StatSet` - the merged,
//! flattened configuration of a behavior declaration. Keys and meanings
//! are behavior-specific; the engine doesn't interpret them.
//!
//! Values arriving from a document are strings; the typed getters coerce
//! `Text` on access so factories can read `power` as an int whether it
//! was set programmatically or parsed from markup.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Value for a single configuration entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Text value (also the carrier for unparsed document attributes).
    Text(String),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Int(v)
    }
}

impl From<i32> for StatValue {
    fn from(v: i32) -> Self {
        StatValue::Int(v as i64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        StatValue::Bool(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

/// A flat, string-keyed configuration record.
///
/// ## Example
///
/// ```
/// use skill_engine::skills::StatSet;
///
/// let mut set = StatSet::new();
/// set.set("power", 45);
/// set.set("over-time", "true");
///
/// assert_eq!(set.get_int("power", 0), 45);
/// assert!(set.get_bool("over-time", false)); // coerced from text
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSet {
    entries: FxHashMap<String, StatValue>,
}

impl StatSet {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entry, replacing any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<StatValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Raw entry lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.entries.get(key)
    }

    /// Whether an entry exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Integer entry, coercing from `Float` and parseable `Text`.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.entries.get(key) {
            Some(StatValue::Int(v)) => *v,
            Some(StatValue::Float(v)) => *v as i64,
            Some(StatValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Float entry, coercing from `Int` and parseable `Text`.
    #[must_use]
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.entries.get(key) {
            Some(StatValue::Float(v)) => *v,
            Some(StatValue::Int(v)) => *v as f64,
            Some(StatValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Boolean entry, coercing from `Text` ("true"/"false").
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(StatValue::Bool(v)) => *v,
            Some(StatValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Text entry. Non-text values render through `Display`-like formatting.
    #[must_use]
    pub fn get_text(&self, key: &str, default: &str) -> String {
        match self.entries.get(key) {
            Some(StatValue::Text(s)) => s.clone(),
            Some(StatValue::Int(v)) => v.to_string(),
            Some(StatValue::Float(v)) => v.to_string(),
            Some(StatValue::Bool(v)) => v.to_string(),
            None => default.to_string(),
        }
    }

    /// Fill missing entries from a base record.
    ///
    /// Existing entries win: merging a per-level row under its static
    /// declaration keeps the row's overrides and inherits the rest.
    pub fn merge_under(&mut self, base: &StatSet) {
        for (key, value) in &base.entries {
            self.entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters_coerce_text() {
        let mut set = StatSet::new();
        set.set("power", "45");
        set.set("chance", "12.5");
        set.set("instant", "true");

        assert_eq!(set.get_int("power", 0), 45);
        assert!((set.get_float("chance", 0.0) - 12.5).abs() < f64::EPSILON);
        assert!(set.get_bool("instant", false));
        assert_eq!(set.get_int("absent", 9), 9);
    }

    #[test]
    fn test_merge_under_keeps_own_entries() {
        let mut base = StatSet::new();
        base.set("power", 10);
        base.set("ticks", 3);

        let mut row = StatSet::new();
        row.set("power", 45);
        row.merge_under(&base);

        assert_eq!(row.get_int("power", 0), 45);
        assert_eq!(row.get_int("ticks", 0), 3);
    }
}
