pub mod event_log;
pub mod log_record;
