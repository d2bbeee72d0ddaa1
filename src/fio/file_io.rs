use std::{fs::File, io::Write};

use log::error;

use crate::errors::{Errors, Result};

use super::IOManager;

/// Standard file appender over the (already locked) log handle.
pub struct FileIO {
  fd: File,
}

impl FileIO {
  pub fn new(fd: File) -> Self {
    FileIO { fd }
  }
}

impl IOManager for FileIO {
  fn write(&mut self, buf: &[u8]) -> Result<usize> {
    if let Err(e) = self.fd.write_all(buf) {
      error!("failed to write to transaction log: {}", e);
      return Err(Errors::LogIO(e.to_string()));
    }
    Ok(buf.len())
  }

  fn sync(&mut self) -> Result<()> {
    if let Err(e) = self.fd.sync_data() {
      error!("failed to sync transaction log: {}", e);
      return Err(Errors::LogIO(e.to_string()));
    }
    Ok(())
  }
}
