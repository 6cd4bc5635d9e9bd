//! Flat multi-partition stores with weak, lifetime-checked handles.
//!
//! A [`PartitionStore`] is an ordered mapping from a caller-chosen category
//! name to an independent flat partition (variable name → value). Values
//! can be assigned positionally across all partitions at once, one
//! category can be copied into another with an overwrite policy, and every
//! partition persists through the [`crate::keyval`] codec.
//!
//! [`PartitionHandle`]s are non-owning views of one partition. Each slot in
//! the partition table carries a generation counter; removing a category
//! (or replacing it, or dropping the store) bumps the generation, and every
//! handle dereference checks it first — access through an outdated handle
//! fails with [`ConfigError::StaleReference`] rather than reading stale
//! data.
//!
//! The table sits behind a single [`parking_lot::Mutex`], held for the
//! duration of each operation. There is no finer-grained design: the store
//! targets single-threaded configuration plumbing, the lock just keeps
//! handle checks and mutation well-ordered if one is shared anyway.
//!
//! # Example
//!
//! ```rust
//! use strata_config::PartitionStore;
//! use serde_json::json;
//!
//! let mut store = PartitionStore::new();
//! let handles = store.add_categories(&["default_settings", "current_settings"]);
//! store.set_values("log_file", &[json!("default.log"), json!("my.log")])?;
//!
//! assert_eq!(handles[1].get("log_file")?, json!("my.log"));
//!
//! store.remove_category("current_settings")?;
//! assert!(handles[1].get("log_file").is_err());
//! # Ok::<(), strata_config::ConfigError>(())
//! ```

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::keyval;

/// A flat variable-name → value table owned by one store category.
pub type Partition = Map<String, Value>;

#[derive(Debug)]
struct Slot {
    name: String,
    generation: u64,
    /// `None` once the category has been removed; the slot stays behind so
    /// outstanding handles keep failing deterministically.
    partition: Option<Partition>,
}

#[derive(Debug, Default)]
struct Table {
    slots: Vec<Slot>,
}

impl Table {
    fn live(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.partition.is_some())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.partition.is_some() && slot.name == name)
    }
}

/// An ordered mapping from category name to an independent flat partition.
///
/// Categories keep insertion order; a variable may exist in some
/// partitions and not others. See the [module docs](self) for the handle
/// and locking model.
#[derive(Debug)]
pub struct PartitionStore {
    table: Arc<Mutex<Table>>,
}

impl PartitionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
        }
    }

    /// Append an empty partition under `name` and return a handle to it.
    ///
    /// Re-adding an existing name replaces that partition in place — its
    /// position is kept and handles to the old partition become stale.
    pub fn add_category(&mut self, name: &str) -> PartitionHandle {
        let handle = self.insert_partition(name, Partition::new());
        debug!(category = name, "added partition");
        handle
    }

    /// Append one empty partition per name, in call order.
    pub fn add_categories(&mut self, names: &[&str]) -> Vec<PartitionHandle> {
        names.iter().map(|name| self.add_category(name)).collect()
    }

    /// A weak handle to the existing partition under `name`.
    pub fn handle(&self, name: &str) -> ConfigResult<PartitionHandle> {
        let table = self.table.lock();
        let index = table
            .find(name)
            .ok_or_else(|| ConfigError::not_found("partition", name))?;
        let generation = table.slots[index].generation;
        Ok(PartitionHandle {
            table: Arc::downgrade(&self.table),
            index,
            generation,
            name: name.to_string(),
        })
    }

    /// Remove the partition under `name`.
    ///
    /// The partition is destroyed; every outstanding handle to it fails
    /// with [`ConfigError::StaleReference`] from here on.
    pub fn remove_category(&mut self, name: &str) -> ConfigResult<()> {
        {
            let mut table = self.table.lock();
            let index = table
                .find(name)
                .ok_or_else(|| ConfigError::not_found("partition", name))?;
            let slot = &mut table.slots[index];
            slot.generation += 1;
            slot.partition = None;
        }
        debug!(category = name, "removed partition");
        Ok(())
    }

    /// Category names, in insertion order.
    pub fn categories(&self) -> Vec<String> {
        self.table
            .lock()
            .live()
            .map(|slot| slot.name.clone())
            .collect()
    }

    /// Number of partitions in the store.
    pub fn len(&self) -> usize {
        self.table.lock().live().count()
    }

    /// Whether the store holds no partitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a partition exists under `name`.
    pub fn contains_category(&self, name: &str) -> bool {
        self.table.lock().find(name).is_some()
    }

    /// Assign `values` positionally across partitions, in store order.
    ///
    /// A `Value::Null` placeholder leaves that partition's variable
    /// unchanged (skip, not delete). Passing no values, or more values
    /// than there are partitions, fails with [`ConfigError::Arity`].
    pub fn set_values(&mut self, var: &str, values: &[Value]) -> ConfigResult<()> {
        let mut table = self.table.lock();
        let indices: Vec<usize> = table
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.partition.is_some())
            .map(|(index, _)| index)
            .collect();
        if values.is_empty() || values.len() > indices.len() {
            return Err(ConfigError::Arity {
                given: values.len(),
                max: indices.len(),
            });
        }
        for (&index, value) in indices.iter().zip(values) {
            if value.is_null() {
                continue;
            }
            if let Some(partition) = table.slots[index].partition.as_mut() {
                partition.insert(var.to_string(), value.clone());
            }
        }
        Ok(())
    }

    /// The variable's value in every partition, in store order.
    ///
    /// Positions where the variable is not set hold `Value::Null`.
    pub fn get_values(&self, var: &str) -> Vec<Value> {
        self.table
            .lock()
            .live()
            .map(|slot| {
                slot.partition
                    .as_ref()
                    .and_then(|partition| partition.get(var))
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect()
    }

    /// Set one variable in one partition.
    pub fn set_value(
        &mut self,
        category: &str,
        var: &str,
        value: impl Into<Value>,
    ) -> ConfigResult<()> {
        let mut table = self.table.lock();
        let index = table
            .find(category)
            .ok_or_else(|| ConfigError::not_found("partition", category))?;
        if let Some(partition) = table.slots[index].partition.as_mut() {
            partition.insert(var.to_string(), value.into());
        }
        Ok(())
    }

    /// Read one variable from one partition.
    pub fn get_value(&self, category: &str, var: &str) -> ConfigResult<Value> {
        let table = self.table.lock();
        let index = table
            .find(category)
            .ok_or_else(|| ConfigError::not_found("partition", category))?;
        table.slots[index]
            .partition
            .as_ref()
            .and_then(|partition| partition.get(var))
            .cloned()
            .ok_or_else(|| ConfigError::not_found("variable", var))
    }

    /// A snapshot of the partition under `name`.
    pub fn partition(&self, name: &str) -> ConfigResult<Partition> {
        let table = self.table.lock();
        let index = table
            .find(name)
            .ok_or_else(|| ConfigError::not_found("partition", name))?;
        Ok(table.slots[index].partition.clone().unwrap_or_default())
    }

    /// Copy variables from one partition into another.
    ///
    /// With `overwrite`, the destination becomes the union of both
    /// partitions with source values winning on key conflicts; without it,
    /// only keys absent from the destination are copied and destination
    /// values are never overwritten. Either way the destination is mutated
    /// in place, so handles to it stay valid. Returns a snapshot of the
    /// destination after the copy.
    pub fn copy_category(
        &mut self,
        from: &str,
        to: &str,
        overwrite: bool,
    ) -> ConfigResult<Partition> {
        let mut table = self.table.lock();
        let from_index = table
            .find(from)
            .ok_or_else(|| ConfigError::not_found("partition", from))?;
        let to_index = table
            .find(to)
            .ok_or_else(|| ConfigError::not_found("partition", to))?;
        let source = table.slots[from_index].partition.clone().unwrap_or_default();
        match table.slots[to_index].partition.as_mut() {
            Some(dest) => {
                for (key, value) in &source {
                    if overwrite || !dest.contains_key(key) {
                        dest.insert(key.clone(), value.clone());
                    }
                }
                Ok(dest.clone())
            }
            None => Err(ConfigError::not_found("partition", to)),
        }
    }

    /// Encode every partition to its own key-value file.
    ///
    /// `file_names` overrides the target path per category; every other
    /// partition goes to `<category>.conf`. Returns the `(category, path)`
    /// pairs written, in store order.
    pub fn dump(
        &self,
        file_names: &HashMap<String, PathBuf>,
    ) -> ConfigResult<Vec<(String, PathBuf)>> {
        let entries = self.snapshot_entries();
        let mut written = Vec::with_capacity(entries.len());
        for (name, partition) in entries {
            let path = file_names
                .get(&name)
                .cloned()
                .unwrap_or_else(|| PathBuf::from(format!("{name}.conf")));
            keyval::dump_keyval(&path, &partition)?;
            written.push((name, path));
        }
        debug!(partitions = written.len(), "dumped store");
        Ok(written)
    }

    /// Decode key-value files into new partitions, in sequence order.
    ///
    /// Each file becomes a partition under its category name, inserted the
    /// same way [`PartitionStore::add_category`] inserts. Not transactional:
    /// partitions loaded before a failing file stay in the store.
    pub fn load(&mut self, files: &[(String, PathBuf)]) -> ConfigResult<Vec<PartitionHandle>> {
        let mut handles = Vec::with_capacity(files.len());
        for (name, path) in files {
            let partition = keyval::load_keyval(path)?;
            debug!(category = name.as_str(), path = %path.display(), "loaded partition");
            handles.push(self.insert_partition(name, partition));
        }
        Ok(handles)
    }

    /// Write all partitions into one multi-section file.
    ///
    /// Each partition is preceded by a `[<category>]` separator line;
    /// sections appear in store order.
    pub fn dump_into_one(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let mut out = String::new();
        for (name, partition) in self.snapshot_entries() {
            out.push_str(&format!("\n[{name}]\n"));
            out.push_str(&keyval::encode(&partition));
        }
        std::fs::write(path.as_ref(), out)?;
        debug!(path = %path.as_ref().display(), "dumped store into one file");
        Ok(())
    }

    /// The whole store as an ordered mapping for structured serializers.
    ///
    /// Categories appear in store order, each as an object of its
    /// partition's variables in partition order. Any YAML/JSON encoder can
    /// consume the returned value directly.
    pub fn to_ordered_mapping(&self) -> Value {
        let mut out = Map::new();
        for (name, partition) in self.snapshot_entries() {
            out.insert(name, Value::Object(partition));
        }
        Value::Object(out)
    }

    fn snapshot_entries(&self) -> Vec<(String, Partition)> {
        self.table
            .lock()
            .live()
            .map(|slot| {
                (
                    slot.name.clone(),
                    slot.partition.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    fn insert_partition(&mut self, name: &str, partition: Partition) -> PartitionHandle {
        let mut table = self.table.lock();
        let (index, generation) = match table.find(name) {
            Some(index) => {
                let slot = &mut table.slots[index];
                slot.generation += 1;
                slot.partition = Some(partition);
                (index, slot.generation)
            }
            None => {
                table.slots.push(Slot {
                    name: name.to_string(),
                    generation: 0,
                    partition: Some(partition),
                });
                (table.slots.len() - 1, 0)
            }
        };
        PartitionHandle {
            table: Arc::downgrade(&self.table),
            index,
            generation,
            name: name.to_string(),
        }
    }
}

impl Default for PartitionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-owning, generation-checked reference to one partition.
///
/// Handles stay valid while their partition remains in the store. Once the
/// category is removed or replaced — or the store itself is dropped —
/// every operation fails with [`ConfigError::StaleReference`]; a handle
/// never reads stale data and never silently succeeds.
#[derive(Debug, Clone)]
pub struct PartitionHandle {
    table: Weak<Mutex<Table>>,
    index: usize,
    generation: u64,
    name: String,
}

impl PartitionHandle {
    /// The category name this handle was created for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a variable through the handle.
    pub fn get(&self, var: &str) -> ConfigResult<Value> {
        self.with_partition(|partition| partition.get(var).cloned())?
            .ok_or_else(|| ConfigError::not_found("variable", var))
    }

    /// Write a variable through the handle.
    pub fn set(&self, var: &str, value: impl Into<Value>) -> ConfigResult<()> {
        let value = value.into();
        self.with_partition_mut(|partition| {
            partition.insert(var.to_string(), value);
        })
    }

    /// Whether the variable is set in the partition.
    pub fn contains(&self, var: &str) -> ConfigResult<bool> {
        self.with_partition(|partition| partition.contains_key(var))
    }

    /// A snapshot of the whole partition.
    pub fn snapshot(&self) -> ConfigResult<Partition> {
        self.with_partition(|partition| partition.clone())
    }

    /// Whether the underlying partition no longer exists.
    pub fn is_stale(&self) -> bool {
        self.with_partition(|_| ()).is_err()
    }

    fn with_partition<T>(&self, read: impl FnOnce(&Partition) -> T) -> ConfigResult<T> {
        let table = self.table.upgrade().ok_or_else(|| self.stale())?;
        let guard = table.lock();
        let slot = guard.slots.get(self.index).ok_or_else(|| self.stale())?;
        if slot.generation != self.generation {
            return Err(self.stale());
        }
        match &slot.partition {
            Some(partition) => Ok(read(partition)),
            None => Err(self.stale()),
        }
    }

    fn with_partition_mut<T>(&self, write: impl FnOnce(&mut Partition) -> T) -> ConfigResult<T> {
        let table = self.table.upgrade().ok_or_else(|| self.stale())?;
        let mut guard = table.lock();
        let slot = guard.slots.get_mut(self.index).ok_or_else(|| self.stale())?;
        if slot.generation != self.generation {
            return Err(self.stale());
        }
        match slot.partition.as_mut() {
            Some(partition) => Ok(write(partition)),
            None => Err(self.stale()),
        }
    }

    fn stale(&self) -> ConfigError {
        ConfigError::StaleReference {
            name: self.name.clone(),
        }
    }
}
