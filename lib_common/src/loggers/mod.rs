/// Fern-based console and file logging with rotation.
pub mod loggerlocal;

pub use loggerlocal::{parse_level, rotate_logs, setup_logging};
