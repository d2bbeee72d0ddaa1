use std::{fs, sync::Arc};

use crossbeam_channel::Receiver;
use log::{error, info};
use parking_lot::Mutex;

use crate::{
  data::event_log::EventLog,
  errors::{Errors, Result},
  logger::{FileTransactionLogger, TransactionLogger},
  option::Options,
  replay::{self, ReplayStats},
  store::KeyValueStore,
};

/// Store plus transaction log, the handle shared by request handlers.
pub struct Engine {
  options: Arc<Options>,
  store: KeyValueStore,
  logger: Box<dyn TransactionLogger>,
  // Couples a store mutation with its enqueue so log order is apply order.
  commit_lock: Mutex<()>,
  replayed_events: usize,
}

/// Point-in-time statistics of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
  pub key_num: usize,
  pub last_sequence: u64,
  pub replayed_events: usize,
}

impl Engine {
  /// Opens the log, replays it into a fresh store, then starts the writer.
  ///
  /// Any replay failure is returned and no engine is built.
  pub fn open(opts: Options) -> Result<Self> {
    check_options(&opts)?;

    if let Some(dir) = opts.log_path.parent() {
      if !dir.as_os_str().is_empty() && !dir.is_dir() {
        if let Err(e) = fs::create_dir_all(dir) {
          error!("create transaction log dir err: {}", e);
          return Err(Errors::FailedToCreateLogDir);
        }
      }
    }

    let log = EventLog::open(&opts.log_path, opts.replay_io_type())?;
    let store = KeyValueStore::new();
    let stats = match replay::replay(&log, &store) {
      Ok(stats) => stats,
      Err(e) => {
        error!("replay of {:?} failed: {}", opts.log_path, e);
        return Err(e);
      }
    };
    let logger = FileTransactionLogger::run(log, &stats, &opts)?;
    info!("engine ready with {} keys", store.len());

    Ok(Self::with_logger(opts, store, Box::new(logger), &stats))
  }

  pub(crate) fn with_logger(
    opts: Options,
    store: KeyValueStore,
    logger: Box<dyn TransactionLogger>,
    stats: &ReplayStats,
  ) -> Self {
    Engine {
      options: Arc::new(opts),
      store,
      logger,
      commit_lock: Mutex::new(()),
      replayed_events: stats.replayed(),
    }
  }

  pub fn put(&self, key: &str, value: &str) -> Result<()> {
    self.check_mutation(key)?;

    let _guard = self.commit_lock.lock();
    self.ensure_logger_healthy()?;
    self.store.put(key, value);
    self.logger.write_put(key, value);
    Ok(())
  }

  pub fn get(&self, key: &str) -> Result<String> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }

    let value = self.store.get(key)?;
    if self.options.log_informational_events {
      let _guard = self.commit_lock.lock();
      if !self.logger.is_failed() {
        self.logger.write_get(key, &value);
      }
    }
    Ok(value)
  }

  /// Removes `key`. Deleting an absent key succeeds.
  pub fn delete(&self, key: &str) -> Result<()> {
    self.check_mutation(key)?;

    let _guard = self.commit_lock.lock();
    self.ensure_logger_healthy()?;
    self.store.delete(key);
    self.logger.write_delete(key);
    Ok(())
  }

  /// False once the transaction log has failed.
  pub fn health_check(&self) -> bool {
    if !self.options.log_informational_events {
      return !self.logger.is_failed();
    }

    let _guard = self.commit_lock.lock();
    if self.logger.is_failed() {
      return false;
    }
    self.logger.write_health_check();
    true
  }

  /// Asynchronous log write failures, for a supervising component.
  pub fn failures(&self) -> Receiver<Errors> {
    self.logger.failures()
  }

  pub fn stat(&self) -> Stat {
    Stat {
      key_num: self.store.len(),
      last_sequence: self.logger.last_sequence(),
      replayed_events: self.replayed_events,
    }
  }

  fn check_mutation(&self, key: &str) -> Result<()> {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    self.ensure_logger_healthy()
  }

  // A degraded writer no longer drains the queue; refuse rather than block.
  // Callers re-check under the commit lock. A failure that lands after that
  // check, while the queue is full, still leaves the caller blocked in the
  // enqueue: that is the degraded state of the logger itself.
  fn ensure_logger_healthy(&self) -> Result<()> {
    if self.logger.is_failed() {
      return Err(Errors::LoggerDegraded);
    }
    Ok(())
  }
}

fn check_options(opts: &Options) -> Result<()> {
  if opts.log_path.as_os_str().is_empty() {
    return Err(Errors::FailedToOpenLogFile);
  }

  if opts.queue_capacity == 0 {
    return Err(Errors::InvalidQueueCapacity);
  }

  Ok(())
}
