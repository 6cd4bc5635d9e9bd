//! Error types shared across the crate.

use thiserror::Error;

/// Errors produced by configuration operations.
///
/// All errors are synchronous return values surfaced directly to the
/// caller; nothing in this crate retries or swallows a failure. Recursive
/// operations ([`crate::ConfigGroup::merge_from`], [`crate::PartitionStore::load`])
/// are not transactional — work done before the failing step is kept.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A category, partition, field, or variable was looked up by a name
    /// that holds no value.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What kind of entry was looked up (category, partition, field, variable).
        kind: &'static str,
        /// The name that was looked up.
        name: String,
    },

    /// Access through a handle whose partition was removed from its store,
    /// or whose store no longer exists.
    #[error("stale reference to partition '{name}'")]
    StaleReference {
        /// The category name the handle was created for.
        name: String,
    },

    /// Wrong number of positional values in a bulk set.
    #[error("expected between 1 and {max} values, got {given}")]
    Arity {
        /// How many values the caller passed.
        given: usize,
        /// The number of partitions in the store.
        max: usize,
    },

    /// A merge mapping referenced a field the schema does not declare.
    #[error("unknown field '{field}' in merge mapping")]
    SchemaMismatch {
        /// The undeclared field name.
        field: String,
    },

    /// Malformed key-value text.
    #[error("malformed key-value line '{line}': {reason}")]
    Format {
        /// The offending line.
        line: String,
        /// Why the line was rejected.
        reason: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn not_found(kind: &'static str, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
