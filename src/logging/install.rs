use crate::error::{ConfigError, Result};
use crate::logging::config::{HandlerConfig, LOGGER_NAME, LoggingConfig};
use crate::logging::pattern::Pattern;
use std::fs::OpenOptions;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the logging pipeline alive; dropping it flushes the file handler.
pub struct LoggingGuard {
	_file_guard: Option<WorkerGuard>,
}

/// Parse a level name into a tracing filter.
///
/// Accepts the classic names (`CRITICAL`, `FATAL`, `ERROR`, `WARNING`, `WARN`,
/// `INFO`, `DEBUG`, `NOTSET`) and `TRACE`, in any case.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
	match level.to_uppercase().as_str() {
		"CRITICAL" | "FATAL" | "ERROR" => Ok(LevelFilter::ERROR),
		"WARNING" | "WARN" => Ok(LevelFilter::WARN),
		"INFO" => Ok(LevelFilter::INFO),
		"DEBUG" => Ok(LevelFilter::DEBUG),
		"TRACE" | "NOTSET" => Ok(LevelFilter::TRACE),
		_ => Err(ConfigError::InvalidLogLevel {
			level: level.to_string(),
		}),
	}
}

/// Compile every handler attached to the `dispytch` logger into a layer.
///
/// Each layer only sees events whose target is `dispytch` or below it, at the
/// handler's level. The null handler produces no layer.
fn build_layers(config: &LoggingConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
	let logger = config.logger().ok_or_else(|| ConfigError::LoggingInit {
		reason: format!("no '{}' logger configured", LOGGER_NAME),
	})?;

	let mut layers: Vec<BoxedLayer> = Vec::new();
	let mut file_guard = None;

	for name in &logger.handlers {
		let handler = config.handler(name).ok_or_else(|| ConfigError::LoggingInit {
			reason: format!("logger refers to unknown handler '{}'", name),
		})?;

		match handler {
			HandlerConfig::Null => {}
			HandlerConfig::Console {
				level, formatter, ..
			} => {
				let pattern = compile_pattern(config, formatter)?;
				let targets = Targets::new().with_target(LOGGER_NAME, parse_level(level)?);
				let layer = tracing_subscriber::fmt::layer()
					.event_format(pattern)
					.with_writer(io::stdout)
					.with_filter(targets)
					.boxed();
				layers.push(layer);
			}
			HandlerConfig::File {
				level,
				formatter,
				filename,
			} => {
				let pattern = compile_pattern(config, formatter)?;
				let targets = Targets::new().with_target(LOGGER_NAME, parse_level(level)?);
				let file = OpenOptions::new()
					.create(true)
					.append(true)
					.open(filename)
					.map_err(|source| ConfigError::LogFileError {
						path: filename.clone(),
						source,
					})?;
				let (writer, guard) = tracing_appender::non_blocking(file);
				let layer = tracing_subscriber::fmt::layer()
					.event_format(pattern)
					.with_writer(writer)
					.with_ansi(false)
					.with_filter(targets)
					.boxed();
				layers.push(layer);
				file_guard = Some(guard);
			}
		}
	}

	Ok((layers, file_guard))
}

fn compile_pattern(config: &LoggingConfig, formatter: &str) -> Result<Pattern> {
	let format = config
		.format_for(formatter)
		.ok_or_else(|| ConfigError::LoggingInit {
			reason: format!("handler refers to unknown formatter '{}'", formatter),
		})?;
	Pattern::parse(format)
}

/// Check that every level and pattern in the configuration compiles, without
/// opening files or installing anything.
pub fn validate(config: &LoggingConfig) -> Result<()> {
	for handler in config.handlers.values() {
		match handler {
			HandlerConfig::Null => {}
			HandlerConfig::Console {
				level, formatter, ..
			}
			| HandlerConfig::File {
				level, formatter, ..
			} => {
				parse_level(level)?;
				compile_pattern(config, formatter)?;
			}
		}
	}
	if let Some(logger) = config.logger() {
		parse_level(&logger.level)?;
	}
	Ok(())
}

/// Install the configuration as the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn install(config: &LoggingConfig) -> Result<LoggingGuard> {
	let (layers, file_guard) = build_layers(config)?;

	tracing_subscriber::registry()
		.with(layers)
		.try_init()
		.map_err(|e| ConfigError::LoggingInit {
			reason: e.to_string(),
		})?;

	tracing::debug!(
		target: "dispytch::logging",
		handlers = ?config.logger().map(|l| &l.handlers),
		"logging installed"
	);

	Ok(LoggingGuard {
		_file_guard: file_guard,
	})
}
