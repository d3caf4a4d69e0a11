use crate::config::Section;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the reserved section the logging configuration is built from.
pub const LOGGING_SECTION: &str = "logging";

/// Name of the single logger the configuration describes.
pub const LOGGER_NAME: &str = "dispytch";

/// Level used when the `logging` section has no `level` option.
pub const DEFAULT_LEVEL: &str = "debug";

/// Message pattern used when the `logging` section has no `format` option.
pub const DEFAULT_FORMAT: &str = "%(asctime)s %(name)s [%(levelname)s] %(message)s";

/// Name of the formatter every handler refers to.
pub const FORMATTER_NAME: &str = "simple";

pub const NULL_HANDLER: &str = "null";
pub const CONSOLE_HANDLER: &str = "console";
pub const FILE_HANDLER: &str = "file";

/// Logging setup derived from the `logging` section.
///
/// The shape mirrors a classic dict-based logging configuration: named
/// formatters, named handlers, and loggers that refer to handlers by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
	pub version: u32,
	pub formatters: BTreeMap<String, FormatterConfig>,
	pub handlers: BTreeMap<String, HandlerConfig>,
	pub loggers: BTreeMap<String, LoggerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatterConfig {
	pub format: String,
}

/// An output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum HandlerConfig {
	/// Discards everything.
	Null,

	/// Writes to standard output.
	Console {
		level: String,
		formatter: String,
		stream: String,
	},

	/// Appends to a file.
	File {
		level: String,
		formatter: String,
		filename: PathBuf,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerConfig {
	pub level: String,
	/// Handler names, in attachment order.
	pub handlers: Vec<String>,
	pub propagate: bool,
}

impl LoggingConfig {
	/// Build the configuration from the options of the `logging` section.
	pub fn from_section(section: &Section) -> Self {
		let level = section.get_or("level", DEFAULT_LEVEL).to_uppercase();
		let format = section.get_or("format", DEFAULT_FORMAT).to_string();

		let mut handlers = BTreeMap::new();
		let mut attached = vec![NULL_HANDLER.to_string()];
		handlers.insert(NULL_HANDLER.to_string(), HandlerConfig::Null);

		if section.get("console") == Some("yes") {
			handlers.insert(
				CONSOLE_HANDLER.to_string(),
				HandlerConfig::Console {
					level: level.clone(),
					formatter: FORMATTER_NAME.to_string(),
					stream: "stdout".to_string(),
				},
			);
			attached.push(CONSOLE_HANDLER.to_string());
		}

		if let Some(file) = section.get("file").filter(|f| !f.is_empty()) {
			handlers.insert(
				FILE_HANDLER.to_string(),
				HandlerConfig::File {
					level: level.clone(),
					formatter: FORMATTER_NAME.to_string(),
					filename: PathBuf::from(file),
				},
			);
			attached.push(FILE_HANDLER.to_string());
		}

		let mut formatters = BTreeMap::new();
		formatters.insert(FORMATTER_NAME.to_string(), FormatterConfig { format });

		let mut loggers = BTreeMap::new();
		loggers.insert(
			LOGGER_NAME.to_string(),
			LoggerConfig {
				level,
				handlers: attached,
				propagate: false,
			},
		);

		LoggingConfig {
			version: 1,
			formatters,
			handlers,
			loggers,
		}
	}

	/// The `dispytch` logger.
	pub fn logger(&self) -> Option<&LoggerConfig> {
		self.loggers.get(LOGGER_NAME)
	}

	pub fn handler(&self, name: &str) -> Option<&HandlerConfig> {
		self.handlers.get(name)
	}

	/// The format string a handler's formatter refers to.
	pub fn format_for(&self, formatter: &str) -> Option<&str> {
		self.formatters.get(formatter).map(|f| f.format.as_str())
	}
}
