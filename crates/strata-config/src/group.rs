//! Recursive setting trees and their projection/merge operations.
//!
//! A [`ConfigGroup`] is an ordered mapping from field name to either a
//! [`CategoryValue`] leaf or a nested group. The field set is fixed once
//! the group is built: projection and merge only ever set values on
//! declared fields, and a mapping that names an undeclared field fails
//! with [`ConfigError::SchemaMismatch`].
//!
//! # Example
//!
//! ```rust
//! use strata_config::{CategoryValue, ConfigGroup, STD};
//! use serde_json::json;
//!
//! let mut logging = ConfigGroup::builder()
//!     .leaf("level", CategoryValue::new("INFO"))
//!     .leaf("filename", CategoryValue::new("output.log"))
//!     .build();
//!
//! let defaults = logging.project(STD, false);
//! assert_eq!(defaults.get("level"), Some(&json!("INFO")));
//!
//! // Round-tripping a projection through a merge is a no-op.
//! let snapshot = logging.project(STD, false);
//! logging.merge_from(&snapshot, STD)?;
//! assert_eq!(logging.project(STD, false), snapshot);
//! # Ok::<(), strata_config::ConfigError>(())
//! ```

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::item::CategoryValue;

/// A child of a [`ConfigGroup`]: a leaf or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// A single category-valued setting.
    Leaf(CategoryValue),
    /// A nested group of settings.
    Group(ConfigGroup),
}

/// An ordered, fixed-schema collection of settings.
///
/// Groups exclusively own their children. Field declaration order is
/// preserved by projection and serialization but carries no meaning beyond
/// determinism.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigGroup {
    fields: Vec<(String, ConfigNode)>,
}

impl ConfigGroup {
    /// Start declaring a group schema.
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the group declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&ConfigNode> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    /// The leaf declared under `name`.
    pub fn leaf(&self, name: &str) -> ConfigResult<&CategoryValue> {
        match self.field(name) {
            Some(ConfigNode::Leaf(leaf)) => Ok(leaf),
            _ => Err(ConfigError::not_found("field", name)),
        }
    }

    /// Mutable access to the leaf declared under `name`.
    pub fn leaf_mut(&mut self, name: &str) -> ConfigResult<&mut CategoryValue> {
        match self.field_mut(name) {
            Some(ConfigNode::Leaf(leaf)) => Ok(leaf),
            _ => Err(ConfigError::not_found("field", name)),
        }
    }

    /// The nested group declared under `name`.
    pub fn group(&self, name: &str) -> ConfigResult<&ConfigGroup> {
        match self.field(name) {
            Some(ConfigNode::Group(group)) => Ok(group),
            _ => Err(ConfigError::not_found("field", name)),
        }
    }

    /// Mutable access to the nested group declared under `name`.
    pub fn group_mut(&mut self, name: &str) -> ConfigResult<&mut ConfigGroup> {
        match self.field_mut(name) {
            Some(ConfigNode::Group(group)) => Ok(group),
            _ => Err(ConfigError::not_found("field", name)),
        }
    }

    /// Project the whole subtree to one category.
    ///
    /// Returns an ordered mapping from field name to the leaf's value in
    /// `category`, or to the recursive projection for nested groups.
    /// Leaves whose value is absent (never stored, or the `Null` sentinel)
    /// are skipped unless `include_absent` is set, in which case they
    /// project as `Null`. Nested groups always appear.
    pub fn project(&self, category: &str, include_absent: bool) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, node) in &self.fields {
            match node {
                ConfigNode::Leaf(leaf) => {
                    if leaf.is_present(category) {
                        let value = leaf.raw(category).cloned().unwrap_or(Value::Null);
                        out.insert(name.clone(), value);
                    } else if include_absent {
                        out.insert(name.clone(), Value::Null);
                    }
                }
                ConfigNode::Group(group) => {
                    out.insert(
                        name.clone(),
                        Value::Object(group.project(category, include_absent)),
                    );
                }
            }
        }
        out
    }

    /// Merge a mapping of values into one category, recursively.
    ///
    /// Every key must name a declared field; a leaf field takes the mapped
    /// value verbatim, a group field requires an object to recurse into.
    /// Anything else fails with [`ConfigError::SchemaMismatch`].
    ///
    /// Not transactional: leaves visited before a failing key keep their
    /// new values.
    pub fn merge_from(&mut self, values: &Map<String, Value>, category: &str) -> ConfigResult<()> {
        for (name, value) in values {
            match self.field_mut(name) {
                Some(ConfigNode::Leaf(leaf)) => leaf.set(category, value.clone()),
                Some(ConfigNode::Group(group)) => match value {
                    Value::Object(nested) => group.merge_from(nested, category)?,
                    _ => return Err(ConfigError::SchemaMismatch { field: name.clone() }),
                },
                None => return Err(ConfigError::SchemaMismatch { field: name.clone() }),
            }
        }
        Ok(())
    }

    /// Copy one category's values into another across the whole subtree.
    ///
    /// Depth-first over every leaf: a present `from` value is stored into
    /// `to`; an absent one is skipped, unless `include_absent` is set, in
    /// which case the `Null` sentinel is written through. Idempotent, and
    /// never touches any category other than the two named.
    pub fn copy_category(&mut self, from: &str, to: &str, include_absent: bool) {
        for (_, node) in &mut self.fields {
            match node {
                ConfigNode::Leaf(leaf) => {
                    let source = leaf.raw(from).filter(|value| !value.is_null()).cloned();
                    match source {
                        Some(value) => leaf.set(to, value),
                        None if include_absent => leaf.set(to, Value::Null),
                        None => {}
                    }
                }
                ConfigNode::Group(group) => group.copy_category(from, to, include_absent),
            }
        }
    }

    /// The subtree as an ordered mapping for structured serializers.
    ///
    /// Equivalent to `project(category, false)` wrapped as a
    /// `serde_json::Value`, ready for any YAML/JSON encoder to consume.
    pub fn to_ordered_mapping(&self, category: &str) -> Value {
        Value::Object(self.project(category, false))
    }
}

/// Declares the schema of a [`ConfigGroup`].
///
/// Fields keep their declaration order; re-declaring a name replaces the
/// earlier entry in place.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    fields: Vec<(String, ConfigNode)>,
}

impl GroupBuilder {
    /// Declare a leaf field.
    pub fn leaf(mut self, name: impl Into<String>, item: CategoryValue) -> Self {
        self.insert(name.into(), ConfigNode::Leaf(item));
        self
    }

    /// Declare a nested group field.
    pub fn group(mut self, name: impl Into<String>, group: ConfigGroup) -> Self {
        self.insert(name.into(), ConfigNode::Group(group));
        self
    }

    fn insert(&mut self, name: String, node: ConfigNode) {
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = node;
        } else {
            self.fields.push((name, node));
        }
    }

    /// Finish the schema.
    pub fn build(self) -> ConfigGroup {
        ConfigGroup {
            fields: self.fields,
        }
    }
}
