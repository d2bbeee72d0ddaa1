use std::result;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Errors {
  #[error("the key is empty")]
  KeyIsEmpty,

  #[error("key is not found in store")]
  KeyNotFound,

  #[error("queue capacity must be at least one")]
  InvalidQueueCapacity,

  #[error("failed to create the transaction log directory")]
  FailedToCreateLogDir,

  #[error("failed to open transaction log file")]
  FailedToOpenLogFile,

  #[error("the transaction log is in use by another process")]
  LogFileInUse,

  #[error("failed to read from transaction log file")]
  FailedToReadLogFile,

  /// An append failed in the background writer.
  #[error("failed to write transaction log: {0}")]
  LogIO(String),

  #[error("malformed record at line {line}: {reason}")]
  LogParse { line: usize, reason: String },

  #[error("transaction numbers out of sync at line {line}: {sequence} follows {previous}")]
  LogCorruption {
    line: usize,
    sequence: u64,
    previous: u64,
  },

  #[error("transaction logger has failed, store is read-only")]
  LoggerDegraded,
}

pub type Result<T> = result::Result<T, Errors>;
