//! Plain-text `name=literal` persistence format.
//!
//! One line per entry, in partition order:
//!
//! ```text
//! log=true
//! log_level=5
//! log_file='my.log'
//! ```
//!
//! String values are wrapped in single quotes on encode; embedded quotes
//! are **not** escaped — the quoting is cosmetic, not a safe round-trip
//! guarantee for every possible string. Array and object values render as
//! their compact JSON and do not round-trip either. For partitions whose
//! values are all of the supported literal kinds (`null`, booleans,
//! integers, floats, quoted strings), `decode(encode(p))` reproduces `p`
//! exactly, key order included.
//!
//! [`decode`] is a literal parser, never an evaluator: the right-hand side
//! of each line must be one of the supported literals, and anything else —
//! expressions, identifiers, section headers, comments — is rejected with
//! [`ConfigError::Format`].

use serde_json::{Number, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::store::Partition;

/// Encode a partition as `name=literal` lines, in partition order.
pub fn encode(partition: &Partition) -> String {
    let mut out = String::new();
    for (key, value) in partition {
        out.push_str(key);
        out.push('=');
        out.push_str(&format_literal(value));
        out.push('\n');
    }
    out
}

/// Decode `name=literal` text into a partition.
///
/// Blank lines are skipped; every other line must be a key, a `=`, and a
/// single supported literal. Duplicate keys keep the last value.
pub fn decode(text: &str) -> ConfigResult<Partition> {
    let mut partition = Partition::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, literal) = line.split_once('=').ok_or_else(|| ConfigError::Format {
            line: line.to_string(),
            reason: "missing '='".to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Format {
                line: line.to_string(),
                reason: "empty key".to_string(),
            });
        }
        let value = parse_literal(literal.trim()).map_err(|reason| ConfigError::Format {
            line: line.to_string(),
            reason,
        })?;
        partition.insert(key.to_string(), value);
    }
    Ok(partition)
}

/// Write a partition to `path` in key-value format.
pub fn dump_keyval(path: impl AsRef<Path>, partition: &Partition) -> ConfigResult<()> {
    let path = path.as_ref();
    fs::write(path, encode(partition))?;
    debug!(path = %path.display(), entries = partition.len(), "wrote key-value file");
    Ok(())
}

/// Read a partition from the key-value file at `path`.
pub fn load_keyval(path: impl AsRef<Path>) -> ConfigResult<Partition> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let partition = decode(&text)?;
    debug!(path = %path.display(), entries = partition.len(), "read key-value file");
    Ok(partition)
}

fn format_literal(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

fn parse_literal(literal: &str) -> Result<Value, String> {
    match literal {
        "" => return Err("empty value".to_string()),
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if let Some(quote) = literal.chars().next().filter(|c| *c == '\'' || *c == '"') {
        if literal.len() >= 2 && literal.ends_with(quote) {
            return Ok(Value::String(literal[1..literal.len() - 1].to_string()));
        }
        return Err("unterminated quoted string".to_string());
    }

    if let Ok(int) = literal.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    if let Ok(int) = literal.parse::<u64>() {
        return Ok(Value::Number(int.into()));
    }
    if let Ok(float) = literal.parse::<f64>() {
        return Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| "non-finite float".to_string());
    }

    Err(format!("'{literal}' is not a supported literal"))
}
