//! Startup recovery: rebuilds the store from the transaction log.
//!
//! Replay is strict. The first malformed line or out-of-order sequence
//! aborts it, and nothing after the offending record is applied.

use std::io::BufRead;

use log::{error, info};

use crate::{
  data::{
    event_log::EventLog,
    log_record::{LogRecord, LogRecordType},
  },
  errors::{Errors, Result},
  store::KeyValueStore,
};

/// Outcome of a completed replay.
///
/// Only `replay` can build one, which is what lets the logger insist on it
/// before it starts numbering new records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStats {
  replayed: usize,
  ignored: usize,
  last_sequence: u64,
}

impl ReplayStats {
  /// `Put` and `Delete` records applied to the store.
  pub fn replayed(&self) -> usize {
    self.replayed
  }

  /// Informational records read and skipped.
  pub fn ignored(&self) -> usize {
    self.ignored
  }

  pub fn last_sequence(&self) -> u64 {
    self.last_sequence
  }
}

pub fn replay(log: &EventLog, store: &KeyValueStore) -> Result<ReplayStats> {
  let reader = log.reader()?;
  let stats = replay_from(reader, store)?;
  info!(
    "{} events have been replayed from {:?}, last sequence {}",
    stats.replayed,
    log.path(),
    stats.last_sequence
  );
  Ok(stats)
}

pub(crate) fn replay_from<R: BufRead>(mut reader: R, store: &KeyValueStore) -> Result<ReplayStats> {
  let mut stats = ReplayStats {
    replayed: 0,
    ignored: 0,
    last_sequence: 0,
  };
  let mut buf = Vec::new();
  let mut line_no = 0;

  loop {
    buf.clear();
    let n = match reader.read_until(b'\n', &mut buf) {
      Ok(n) => n,
      Err(e) => {
        error!("transaction log read failure: {}", e);
        return Err(Errors::FailedToReadLogFile);
      }
    };
    if n == 0 {
      break;
    }
    line_no += 1;

    if buf.last() != Some(&b'\n') {
      return Err(Errors::LogParse {
        line: line_no,
        reason: "truncated record".to_string(),
      });
    }
    buf.pop();

    let line = std::str::from_utf8(&buf).map_err(|_| Errors::LogParse {
      line: line_no,
      reason: "invalid utf-8".to_string(),
    })?;
    let record = LogRecord::decode(line).map_err(|e| Errors::LogParse {
      line: line_no,
      reason: e.to_string(),
    })?;

    if record.sequence <= stats.last_sequence {
      return Err(Errors::LogCorruption {
        line: line_no,
        sequence: record.sequence,
        previous: stats.last_sequence,
      });
    }
    stats.last_sequence = record.sequence;

    match record.rec_type {
      LogRecordType::Put => store.put(&record.key, &record.value),
      LogRecordType::Delete => store.delete(&record.key),
      LogRecordType::Get | LogRecordType::HealthCheck => {
        stats.ignored += 1;
        continue;
      }
    }
    stats.replayed += 1;
  }

  Ok(stats)
}
