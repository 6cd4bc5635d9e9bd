//! # Strata Configuration Library
//!
//! A layered, hierarchical configuration store. Every named setting is a
//! [`CategoryValue`] leaf that holds one value per *category* (a compiled-in
//! default, the current effective value, a user override, a description, or
//! any caller-defined slot), and whole subtrees of settings can be projected
//! to a single category, bulk-populated from a mapping, or have one
//! category's values copied into another.
//!
//! Two representations are provided:
//!
//! - [`ConfigGroup`] — a recursive tree of leaves and nested groups with a
//!   schema that is fixed once built
//! - [`PartitionStore`] — a flat, ordered table of named partitions with
//!   positional bulk access and weak, lifetime-checked partition handles
//!
//! Persistence uses a plain-text `name=literal` format (see [`keyval`]);
//! structured encoders (YAML, JSON, …) consume the ordered mappings returned
//! by `to_ordered_mapping` and are deliberately kept outside this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_config::{CategoryValue, ConfigGroup, PartitionStore};
//! use serde_json::json;
//!
//! // Tree variant: a declared schema of category-valued leaves.
//! let logging = ConfigGroup::builder()
//!     .leaf("level", CategoryValue::new("INFO").with_description("logging verbosity"))
//!     .leaf("filename", CategoryValue::new("output.log"))
//!     .build();
//! assert_eq!(logging.leaf("level")?.get("cur")?, &json!("INFO"));
//!
//! // Flat variant: named partitions with positional bulk access.
//! let mut store = PartitionStore::new();
//! store.add_categories(&["default_settings", "current_settings"]);
//! store.set_values("log_file", &[json!("default.log"), json!("my.log")])?;
//! assert_eq!(store.get_value("current_settings", "log_file")?, json!("my.log"));
//! # Ok::<(), strata_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod group;
mod item;
pub mod keyval;
mod store;

pub use error::{ConfigError, ConfigResult};
pub use group::{ConfigGroup, ConfigNode, GroupBuilder};
pub use item::{CategoryValue, CUR, DES, STD, USR};
pub use store::{Partition, PartitionHandle, PartitionStore};
