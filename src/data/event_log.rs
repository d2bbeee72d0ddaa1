use std::{
  fs::{File, OpenOptions},
  io::BufRead,
  path::{Path, PathBuf},
};

use fs2::FileExt;
use log::error;

use crate::{
  errors::{Errors, Result},
  fio::{file_io::FileIO, new_replay_reader, IOManager},
  option::IOManagerType,
};

/// The on-disk transaction log while it is still in read mode.
///
/// The file is exclusively locked for as long as the handle lives, first here
/// and then inside the logger once `into_io_manager` hands it over.
pub struct EventLog {
  path: PathBuf,
  file: File,
  io_type: IOManagerType,
}

impl EventLog {
  pub fn open<P>(path: P, io_type: IOManagerType) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    let file = match OpenOptions::new()
      .create(true)
      .read(true)
      .append(true)
      .open(path.as_ref())
    {
      Ok(file) => file,
      Err(e) => {
        error!("failed to open transaction log {:?}: {}", path.as_ref(), e);
        return Err(Errors::FailedToOpenLogFile);
      }
    };

    if file.try_lock_exclusive().is_err() {
      return Err(Errors::LogFileInUse);
    }

    Ok(EventLog {
      path: path.as_ref().to_path_buf(),
      file,
      io_type,
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Sequential reader from the first byte of the log.
  pub fn reader(&self) -> Result<Box<dyn BufRead>> {
    new_replay_reader(&self.file, self.io_type)
  }

  pub(crate) fn into_io_manager(self) -> Box<dyn IOManager> {
    Box::new(FileIO::new(self.file))
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn test_event_log_open_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.log");

    let log = EventLog::open(&path, IOManagerType::StandardFileIO).unwrap();
    assert!(path.is_file());
    assert_eq!(log.path(), path.as_path());
    assert_eq!(log.reader().unwrap().lines().count(), 0);
  }

  #[test]
  fn test_event_log_exclusive_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.log");

    let first = EventLog::open(&path, IOManagerType::MemoryMap).unwrap();
    let second = EventLog::open(&path, IOManagerType::MemoryMap);
    assert_eq!(second.err(), Some(Errors::LogFileInUse));

    drop(first);
    assert!(EventLog::open(&path, IOManagerType::MemoryMap).is_ok());
  }

  #[test]
  fn test_event_log_hand_over_keeps_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transaction.log");

    let log = EventLog::open(&path, IOManagerType::StandardFileIO).unwrap();
    let mut io = log.into_io_manager();
    io.write(b"1\t2\tk\tv\n").unwrap();
    assert_eq!(
      EventLog::open(&path, IOManagerType::StandardFileIO).err(),
      Some(Errors::LogFileInUse)
    );

    drop(io);
    assert_eq!(fs::read_to_string(&path).unwrap(), "1\t2\tk\tv\n");
  }

  #[test]
  fn test_event_log_open_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("transaction.log");

    let res = EventLog::open(&path, IOManagerType::StandardFileIO);
    assert_eq!(res.err(), Some(Errors::FailedToOpenLogFile));
  }
}
