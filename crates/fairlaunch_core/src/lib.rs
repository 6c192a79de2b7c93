pub mod config;
pub mod error_handler;
pub mod logging;

pub use config::{CONFIG_FILE_NAME, LaunchConfig, NetworkSettings};
pub use error_handler::{BoxError, ErrorCategory, LaunchError, Result};
