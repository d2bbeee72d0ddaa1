//! kvlog: a key-value store backed by an append-only transaction log.
//!
//! Every mutation is applied to an in-memory map and queued for a single
//! background writer, which numbers it and appends it to the log as one line of
//! tab-separated text. On startup the log is replayed to rebuild the map before
//! any new record is accepted.
//!
//! # Features
//!
//! * Non-blocking appends through a bounded queue, with backpressure when full
//! * Strictly increasing sequence numbers assigned by the one writer
//! * Fail-fast replay: malformed or out-of-order records abort startup
//! * Write failures surfaced on a channel; the engine turns read-only after one
//! * Exclusive lock on the log file, optional memory-mapped replay
//!
//! # Basic Usage
//!
//! ```
//! use kvlog::{db::Engine, option::Options};
//!
//! let dir = std::env::temp_dir().join("kvlog-doc");
//! let opts = Options {
//!   log_path: dir.join("transaction.log"),
//!   ..Default::default()
//! };
//! let engine = Engine::open(opts).expect("Failed to open kvlog engine");
//!
//! engine.put("hello", "world").expect("Failed to put");
//! assert_eq!(engine.get("hello").expect("Failed to get"), "world");
//!
//! engine.delete("hello").expect("Failed to delete");
//! # drop(engine);
//! # let _ = std::fs::remove_dir_all(dir);
//! ```

mod fio;

pub mod data;
pub mod db;
pub mod errors;
pub mod logger;
pub mod option;
pub mod replay;
pub mod store;
pub mod util;
