//! Configuration loading and querying for dispytch.
//!
//! This module handles:
//! - Locating `dispytch.conf`
//! - INI parsing into ordered sections
//! - Read-only queries over the loaded sections

pub mod discovery;
pub mod parser;
pub mod store;
pub mod types;

pub use discovery::{
	DEFAULT_CONFIG_NAME, ENV_CONFIG_PATH, candidate_paths, resolve_config_path, user_config_path,
};
pub use parser::{ParseOptions, parse_config_file, parse_config_str};
pub use store::ConfigStore;
pub use types::{DEFAULT_SECTION, DISPATCH_OPTION, Section};
