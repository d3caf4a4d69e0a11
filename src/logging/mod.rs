//! Logging setup for dispytch.
//!
//! This module handles:
//! - Deriving a logging configuration from the `logging` section
//! - Compiling `%(name)s` message patterns
//! - Installing the configuration as the tracing subscriber

pub mod config;
pub mod install;
pub mod pattern;

pub use config::{
	CONSOLE_HANDLER, DEFAULT_FORMAT, DEFAULT_LEVEL, FILE_HANDLER, FORMATTER_NAME, FormatterConfig,
	HandlerConfig, LOGGER_NAME, LOGGING_SECTION, LoggerConfig, LoggingConfig, NULL_HANDLER,
};
pub use install::{LoggingGuard, install, parse_level, validate};
pub use pattern::{Pattern, Record};
