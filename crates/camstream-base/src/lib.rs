pub mod logging;

pub use logging::{StdoutLogger, init_stdout_logger, level_from_env, parse_level};

// Re-export log crate so downstream crates can use camstream_base::log::*
pub use log;
