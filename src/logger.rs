//! Asynchronous transaction logger.
//!
//! Callers enqueue records on a bounded queue and return immediately; a single
//! background thread numbers them, encodes them and appends them to the log.
//! That thread is the only code that ever writes to the log file.

use std::{
  sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
  },
  thread::{self, JoinHandle},
};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error};

use crate::{
  data::{
    event_log::EventLog,
    log_record::{LogRecord, LogRecordType},
  },
  errors::{Errors, Result},
  fio::IOManager,
  option::Options,
  replay::ReplayStats,
};

pub trait TransactionLogger: Send + Sync {
  fn write_put(&self, key: &str, value: &str);

  fn write_delete(&self, key: &str);

  fn write_get(&self, key: &str, value: &str);

  fn write_health_check(&self);

  /// Asynchronous write failures. At most one is ever sent.
  fn failures(&self) -> Receiver<Errors>;

  fn is_failed(&self) -> bool;

  /// Sequence of the last record known to be appended.
  fn last_sequence(&self) -> u64;
}

struct WriterState {
  failed: AtomicBool,
  last_sequence: AtomicU64,
}

pub struct FileTransactionLogger {
  events: Option<Sender<LogRecord>>,
  // Keeps the queue connected once the writer has stopped, so a degraded
  // logger blocks producers instead of failing the send.
  _queue: Receiver<LogRecord>,
  errors: Receiver<Errors>,
  state: Arc<WriterState>,
  writer: Option<JoinHandle<()>>,
}

impl FileTransactionLogger {
  /// Switches a replayed log to append mode and starts the writer.
  pub fn run(log: EventLog, stats: &ReplayStats, options: &Options) -> Result<Self> {
    debug!(
      "starting transaction log writer on {:?} after sequence {}",
      log.path(),
      stats.last_sequence()
    );
    Self::spawn(
      log.into_io_manager(),
      stats.last_sequence(),
      options.queue_capacity,
      options.sync_writes,
    )
  }

  pub(crate) fn spawn(
    sink: Box<dyn IOManager>,
    last_sequence: u64,
    queue_capacity: usize,
    sync_writes: bool,
  ) -> Result<Self> {
    if queue_capacity == 0 {
      return Err(Errors::InvalidQueueCapacity);
    }

    let (events_tx, events_rx) = bounded(queue_capacity);
    let (errors_tx, errors_rx) = bounded(1);
    let state = Arc::new(WriterState {
      failed: AtomicBool::new(false),
      last_sequence: AtomicU64::new(last_sequence),
    });

    let writer_events = events_rx.clone();
    let writer_state = state.clone();
    let writer = thread::Builder::new()
      .name("kvlog-writer".to_string())
      .spawn(move || write_loop(writer_events, sink, writer_state, errors_tx, sync_writes))
      .map_err(|e| {
        error!("failed to spawn transaction log writer: {}", e);
        Errors::LogIO(e.to_string())
      })?;

    Ok(FileTransactionLogger {
      events: Some(events_tx),
      _queue: events_rx,
      errors: errors_rx,
      state,
      writer: Some(writer),
    })
  }

  fn record(&self, rec_type: LogRecordType, key: &str, value: &str) {
    if let Some(events) = &self.events {
      // Blocks while the queue is full. Cannot disconnect while `_queue` lives.
      let _ = events.send(LogRecord::unsequenced(rec_type, key, value));
    }
  }
}

impl TransactionLogger for FileTransactionLogger {
  fn write_put(&self, key: &str, value: &str) {
    self.record(LogRecordType::Put, key, value);
  }

  fn write_delete(&self, key: &str) {
    self.record(LogRecordType::Delete, key, "");
  }

  fn write_get(&self, key: &str, value: &str) {
    self.record(LogRecordType::Get, key, value);
  }

  fn write_health_check(&self) {
    self.record(LogRecordType::HealthCheck, "", "");
  }

  fn failures(&self) -> Receiver<Errors> {
    self.errors.clone()
  }

  fn is_failed(&self) -> bool {
    self.state.failed.load(Ordering::SeqCst)
  }

  fn last_sequence(&self) -> u64 {
    self.state.last_sequence.load(Ordering::SeqCst)
  }
}

impl Drop for FileTransactionLogger {
  fn drop(&mut self) {
    // Closing the sender lets the writer drain what is queued and exit.
    self.events.take();
    if let Some(writer) = self.writer.take() {
      if writer.join().is_err() {
        error!("transaction log writer panicked");
      }
    }
  }
}

fn write_loop(
  events: Receiver<LogRecord>,
  mut sink: Box<dyn IOManager>,
  state: Arc<WriterState>,
  failures: Sender<Errors>,
  sync_writes: bool,
) {
  let mut last_sequence = state.last_sequence.load(Ordering::SeqCst);

  for mut record in events.iter() {
    record.sequence = match last_sequence.checked_add(1) {
      Some(sequence) => sequence,
      None => {
        error!("transaction log writer stopped: sequence exhausted after {}", last_sequence);
        stop_writer(&state, &failures, Errors::LogIO("sequence exhausted".to_string()));
        return;
      }
    };
    let res = sink
      .write(record.encode().as_bytes())
      .and_then(|_| if sync_writes { sink.sync() } else { Ok(()) });
    if let Err(e) = res {
      error!(
        "transaction log writer stopped at sequence {}: {}",
        record.sequence, e
      );
      stop_writer(&state, &failures, e);
      return;
    }
    last_sequence = record.sequence;
    state.last_sequence.store(last_sequence, Ordering::SeqCst);
  }

  if let Err(e) = sink.sync() {
    error!("transaction log sync on close failed: {}", e);
    stop_writer(&state, &failures, e);
    return;
  }
  debug!("transaction log writer closed at sequence {}", last_sequence);
}

fn stop_writer(state: &WriterState, failures: &Sender<Errors>, e: Errors) {
  state.failed.store(true, Ordering::SeqCst);
  let _ = failures.try_send(e);
}
