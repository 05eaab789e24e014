//! Process-level plumbing shared by the binaries: layered configuration and
//! logging bootstrap.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, LoggingConfig, Section};
pub use logging::init_logging_from_config;
