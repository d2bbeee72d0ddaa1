use lazy_static::lazy_static;
use std::path::PathBuf;

lazy_static! {
  pub static ref DEFAULT_LOG_PATH: PathBuf =
    std::env::temp_dir().join("kvlog").join("transaction.log");
}

#[derive(Debug, Clone)]
pub struct Options {
  pub log_path: PathBuf,

  /// Records the writer may hold before `write_*` calls block.
  pub queue_capacity: usize,

  pub sync_writes: bool,

  pub mmap_at_startup: bool,

  /// Also journal `Get` and `HealthCheck` events. They are never replayed.
  pub log_informational_events: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      log_path: DEFAULT_LOG_PATH.clone(),
      queue_capacity: 16,
      sync_writes: false,
      mmap_at_startup: true,
      log_informational_events: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOManagerType {
  StandardFileIO,

  MemoryMap,
}

impl Options {
  pub(crate) fn replay_io_type(&self) -> IOManagerType {
    if self.mmap_at_startup {
      IOManagerType::MemoryMap
    } else {
      IOManagerType::StandardFileIO
    }
  }
}
