//! dispytch - configuration store for the dispytch REST dispatcher.
//!
//! This library provides:
//! - Discovery and INI parsing of `dispytch.conf`
//! - Read-only queries over sections and dispatch entries
//! - A logging configuration derived from the `logging` section, and its
//!   installation as a tracing subscriber
//!
//! # Example
//!
//! ```no_run
//! use dispytch::config::{ConfigStore, resolve_config_path};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let path = resolve_config_path(None, &cwd).unwrap();
//! let store = ConfigStore::load(&path).unwrap();
//!
//! if let Some((section, options)) = store.get_dispatch("users") {
//!     println!("users served by [{}] with {} options", section, options.len());
//! }
//!
//! let logging = store.logging_config().unwrap();
//! let _guard = dispytch::logging::install(&logging).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod logging;

pub use error::{ConfigError, EXIT_CFG_SYNTAX, Result};
