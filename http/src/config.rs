use std::{env, path::PathBuf};

use kvlog::option::Options;
use log::warn;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

const ENV_LOG_PATH: &str = "KVLOG_LOG_PATH";
const ENV_QUEUE_CAPACITY: &str = "KVLOG_QUEUE_CAPACITY";
const ENV_SYNC_WRITES: &str = "KVLOG_SYNC_WRITES";
const ENV_LISTEN_ADDR: &str = "KVLOG_LISTEN_ADDR";

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub listen_addr: String,
  pub options: Options,
}

impl ServerConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|name| env::var(name).ok())
  }

  fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut options = Options::default();

    if let Some(path) = lookup(ENV_LOG_PATH) {
      options.log_path = PathBuf::from(path);
    }

    if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
      match raw.parse::<usize>() {
        Ok(n) => options.queue_capacity = n,
        Err(_) => warn!(
          "ignoring {}={:?}, using {}",
          ENV_QUEUE_CAPACITY, raw, options.queue_capacity
        ),
      }
    }

    if let Some(raw) = lookup(ENV_SYNC_WRITES) {
      options.sync_writes = matches!(raw.as_str(), "1" | "true" | "yes");
    }

    ServerConfig {
      listen_addr: lookup(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
      options,
    }
  }
}
