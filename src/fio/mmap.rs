use std::{fs::File, io::Cursor};

use log::error;
use memmap2::Mmap;

use crate::errors::{Errors, Result};

/// Read-only memory map of the log, used once for replay.
pub struct MMapIO {
  map: Mmap,
}

impl MMapIO {
  pub fn new(file: &File) -> Result<Self> {
    // The writer is not running yet and the file is locked, so the mapping
    // cannot change underneath us during replay.
    match unsafe { Mmap::map(file) } {
      Ok(map) => Ok(MMapIO { map }),
      Err(e) => {
        error!("failed to map transaction log: {}", e);
        Err(Errors::FailedToReadLogFile)
      }
    }
  }

  pub fn size(&self) -> u64 {
    self.map.len() as u64
  }

  pub fn into_reader(self) -> Cursor<Mmap> {
    Cursor::new(self.map)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    fs::{self, OpenOptions},
    io::BufRead,
  };

  use super::*;

  #[test]
  fn test_mmap_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.log");
    let file = OpenOptions::new()
      .create(true)
      .read(true)
      .append(true)
      .open(&path)
      .unwrap();

    let mmap_io = MMapIO::new(&file).unwrap();
    assert_eq!(mmap_io.size(), 0);
    assert_eq!(mmap_io.into_reader().lines().count(), 0);
  }

  #[test]
  fn test_mmap_read_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lines.log");
    fs::write(&path, "1\t2\ta\t1\n2\t2\tb\t2\n").unwrap();
    let file = OpenOptions::new().read(true).open(&path).unwrap();

    let mmap_io = MMapIO::new(&file).unwrap();
    assert_eq!(mmap_io.size(), 16);

    let lines: Vec<String> = mmap_io.into_reader().lines().map(|l| l.unwrap()).collect();
    assert_eq!(lines, vec!["1\t2\ta\t1", "2\t2\tb\t2"]);
  }
}
