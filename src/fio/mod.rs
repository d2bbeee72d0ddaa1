pub mod file_io;
pub mod mmap;

use std::{
  fs::File,
  io::{BufRead, BufReader},
};

use log::{debug, error};

use crate::{
  errors::{Errors, Result},
  option::IOManagerType,
};

use self::mmap::MMapIO;

/// Append side of the transaction log. Only the background writer holds one.
pub trait IOManager: Send {
  fn write(&mut self, buf: &[u8]) -> Result<usize>;

  fn sync(&mut self) -> Result<()>;
}

/// Opens a sequential reader over the whole log, starting at offset zero.
pub fn new_replay_reader(file: &File, io_type: IOManagerType) -> Result<Box<dyn BufRead>> {
  match io_type {
    IOManagerType::StandardFileIO => {
      let handle = file.try_clone().map_err(|e| {
        error!("failed to clone transaction log handle: {}", e);
        Errors::FailedToReadLogFile
      })?;
      Ok(Box::new(BufReader::new(handle)))
    }
    IOManagerType::MemoryMap => {
      let mmap_io = MMapIO::new(file)?;
      debug!("replaying {} mapped bytes of transaction log", mmap_io.size());
      Ok(Box::new(mmap_io.into_reader()))
    }
  }
}
