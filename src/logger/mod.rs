pub mod interval_logger;
pub mod record;

pub use interval_logger::{IntervalLogger, LoggerError, LoggerState};
pub use record::{Line, LogRecord, RECORD_CAPACITY};
