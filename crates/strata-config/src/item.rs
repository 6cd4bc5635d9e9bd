//! Category-valued configuration leaves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};

/// Category name for the compiled-in default value.
pub const STD: &str = "std";

/// Category name for the current effective value.
pub const CUR: &str = "cur";

/// Category name for the user override.
pub const USR: &str = "usr";

/// Category name for the human-readable description.
pub const DES: &str = "des";

/// A single named setting, holding one value per category.
///
/// The category axis is an open set of strings; [`STD`], [`CUR`], [`USR`]
/// and [`DES`] are the conventional slots. A stored `Value::Null` acts as
/// the "unset" sentinel — [`CategoryValue::is_present`] reports whether a
/// category holds anything else.
///
/// Constructing a leaf with a default snapshots that default into the
/// `cur` category, so a freshly declared setting reads the same through
/// `cur` and `std`. The snapshot is taken exactly once: changing `std`
/// afterwards does not update `cur`.
///
/// # Example
///
/// ```rust
/// use strata_config::{CategoryValue, CUR, STD, USR};
/// use serde_json::json;
///
/// let mut level = CategoryValue::new("INFO").with_description("logging verbosity");
/// assert_eq!(level.get(CUR)?, &json!("INFO"));
///
/// level.set(USR, "DEBUG");
/// assert_eq!(level.get(STD)?, &json!("INFO"));
/// assert_eq!(level.get(USR)?, &json!("DEBUG"));
/// # Ok::<(), strata_config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryValue {
    categories: HashMap<String, Value>,
}

impl CategoryValue {
    /// Create a leaf with a default value, snapshotted into `cur`.
    pub fn new(std_value: impl Into<Value>) -> Self {
        let std_value = std_value.into();
        let mut categories = HashMap::new();
        categories.insert(CUR.to_string(), std_value.clone());
        categories.insert(STD.to_string(), std_value);
        Self { categories }
    }

    /// Create a leaf with no categories set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the current effective value, replacing the construction snapshot.
    pub fn with_current(mut self, value: impl Into<Value>) -> Self {
        self.categories.insert(CUR.to_string(), value.into());
        self
    }

    /// Set the user override value.
    pub fn with_user(mut self, value: impl Into<Value>) -> Self {
        self.categories.insert(USR.to_string(), value.into());
        self
    }

    /// Set the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.categories
            .insert(DES.to_string(), Value::String(description.into()));
        self
    }

    /// Set an arbitrary category value (open set).
    pub fn with_category(mut self, category: impl Into<String>, value: impl Into<Value>) -> Self {
        self.categories.insert(category.into(), value.into());
        self
    }

    /// Get the value stored under `category`.
    ///
    /// The only fallback is the construction-time `cur` snapshot; a
    /// category that was never stored fails with
    /// [`ConfigError::NotFound`].
    pub fn get(&self, category: &str) -> ConfigResult<&Value> {
        self.categories
            .get(category)
            .ok_or_else(|| ConfigError::not_found("category", category))
    }

    /// Store `value` under `category`, verbatim. No type coercion, and no
    /// effect on any other category.
    pub fn set(&mut self, category: &str, value: impl Into<Value>) {
        self.categories.insert(category.to_string(), value.into());
    }

    /// Whether `category` holds a value other than the unset sentinel.
    pub fn is_present(&self, category: &str) -> bool {
        matches!(self.categories.get(category), Some(value) if !value.is_null())
    }

    /// The stored value, if any, without the not-found error.
    pub(crate) fn raw(&self, category: &str) -> Option<&Value> {
        self.categories.get(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cur_falls_back_to_std_at_construction() {
        let item = CategoryValue::new("INFO");
        assert_eq!(item.get(CUR).expect("cur missing"), &json!("INFO"));
        assert_eq!(item.get(STD).expect("std missing"), &json!("INFO"));
    }

    #[test]
    fn cur_snapshot_is_not_rederived() {
        let mut item = CategoryValue::new(1);
        item.set(STD, 2);
        assert_eq!(item.get(CUR).expect("cur missing"), &json!(1));
        assert_eq!(item.get(STD).expect("std missing"), &json!(2));
    }

    #[test]
    fn explicit_cur_wins_over_snapshot() {
        let item = CategoryValue::new("output.log").with_current("session.log");
        assert_eq!(item.get(CUR).expect("cur missing"), &json!("session.log"));
    }

    #[test]
    fn unknown_category_is_not_found() {
        let item = CategoryValue::new(true);
        let err = item.get("unit").expect_err("unit should be absent");
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn empty_leaf_has_no_cur() {
        let item = CategoryValue::empty();
        assert!(item.get(CUR).is_err());
        assert!(!item.is_present(CUR));
    }

    #[test]
    fn set_stores_verbatim_in_open_set() {
        let mut item = CategoryValue::empty();
        item.set("unit", "ms");
        assert_eq!(item.get("unit").expect("unit missing"), &json!("ms"));
    }

    #[test]
    fn null_counts_as_absent() {
        let item = CategoryValue::empty().with_user(Value::Null);
        assert!(!item.is_present(USR));
        // The sentinel is still readable as a stored value.
        assert_eq!(item.get(USR).expect("usr missing"), &Value::Null);
    }
}
