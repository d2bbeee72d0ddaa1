use std::collections::HashMap;

use parking_lot::Mutex;

use crate::errors::{Errors, Result};

/// In-memory key/value map; the source of truth for reads.
///
/// Every operation takes the same exclusive lock over the whole map.
#[derive(Debug, Default)]
pub struct KeyValueStore {
  map: Mutex<HashMap<String, String>>,
}

impl KeyValueStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts or overwrites `key`.
  pub fn put(&self, key: &str, value: &str) {
    let mut map = self.map.lock();
    map.insert(key.to_string(), value.to_string());
  }

  pub fn get(&self, key: &str) -> Result<String> {
    let map = self.map.lock();
    map.get(key).cloned().ok_or(Errors::KeyNotFound)
  }

  /// Removes `key`. Absent keys are not an error.
  pub fn delete(&self, key: &str) {
    let mut map = self.map.lock();
    map.remove(key);
  }

  pub fn len(&self) -> usize {
    self.map.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.lock().is_empty()
  }
}
