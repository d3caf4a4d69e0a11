use std::fmt;
use std::path::PathBuf;

/// Exit code used when the configuration file is missing, unreadable or malformed.
pub const EXIT_CFG_SYNTAX: u8 = 1;

/// Library-level structured errors for dispytch.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("File {path} not found or not readable")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("{}", format_syntax_errors(.path, .errors))]
	ConfigSyntaxError {
		path: PathBuf,
		errors: Vec<SyntaxIssue>,
	},

	#[error("Missing required section: [{section}]")]
	MissingSection { section: String },

	#[error("Invalid log level: {level}")]
	InvalidLogLevel { level: String },

	#[error("Invalid log format {format:?}: {reason}")]
	InvalidLogFormat { format: String, reason: String },

	#[error("Failed to open log file: {path}")]
	LogFileError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to install logging: {reason}")]
	LoggingInit { reason: String },
}

impl ConfigError {
	/// True for the errors raised while loading the file, which end the process
	/// with [`EXIT_CFG_SYNTAX`].
	pub fn is_load_failure(&self) -> bool {
		matches!(
			self,
			ConfigError::ConfigNotFound { .. }
				| ConfigError::ConfigReadError { .. }
				| ConfigError::ConfigSyntaxError { .. }
		)
	}
}

/// What went wrong on a single line of an INI file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxIssueKind {
	/// An option appeared before any `[section]` header.
	MissingSectionHeader,
	/// The line is not a header, an option, a comment or a continuation.
	MalformedLine,
	/// A `[section]` header was repeated while parsing strictly.
	DuplicateSection,
}

/// A single parse failure with its 1-based line number and the offending text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
	pub line: usize,
	pub kind: SyntaxIssueKind,
	pub text: String,
}

impl fmt::Display for SyntaxIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let what = match self.kind {
			SyntaxIssueKind::MissingSectionHeader => "option outside of any section",
			SyntaxIssueKind::MalformedLine => "malformed line",
			SyntaxIssueKind::DuplicateSection => "duplicate section",
		};
		write!(f, "[line {:>2}]: {} {:?}", self.line, what, self.text)
	}
}

fn format_syntax_errors(path: &std::path::Path, errors: &[SyntaxIssue]) -> String {
	let mut out = format!("File contains parsing errors: {}", path.display());
	for issue in errors {
		out.push_str("\n\t");
		out.push_str(&issue.to_string());
	}
	out
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
