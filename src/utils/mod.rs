pub(crate) mod fs;
pub(crate) mod logging;

// Public API - utilities used by commands and the binary
pub use fs::display_path;
pub use logging::{init_logging, log_level, LOG_ENV_VAR};
