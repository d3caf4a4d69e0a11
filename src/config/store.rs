use crate::config::parser::{ParseOptions, parse_config_file_with, parse_config_str_with};
use crate::config::types::Section;
use crate::error::{ConfigError, Result};
use crate::logging::{LOGGING_SECTION, LoggingConfig};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// The parsed configuration file.
///
/// A store is built once by [`ConfigStore::load`] and never changes afterwards,
/// so it can be shared by reference with the dispatcher and the logging setup.
#[derive(Debug, Clone)]
pub struct ConfigStore {
	path: PathBuf,
	sections: Vec<Section>,
}

impl ConfigStore {
	/// Load and parse the configuration file at `path`.
	pub fn load(path: &Path) -> Result<Self> {
		Self::load_with(path, ParseOptions::default())
	}

	pub fn load_with(path: &Path, options: ParseOptions) -> Result<Self> {
		let sections = parse_config_file_with(path, options)?;
		tracing::debug!(
			target: "dispytch::config",
			path = %path.display(),
			sections = sections.len(),
			"configuration loaded"
		);
		Ok(ConfigStore {
			path: path.to_path_buf(),
			sections,
		})
	}

	/// Build a store from INI text; `path` is only used in error messages.
	pub fn from_ini_str(content: &str, path: &Path) -> Result<Self> {
		let sections = parse_config_str_with(content, path, ParseOptions::default())?;
		Ok(ConfigStore {
			path: path.to_path_buf(),
			sections,
		})
	}

	/// The file this store was loaded from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Section names in declaration order.
	pub fn get_sections(&self) -> Vec<&str> {
		self.sections.iter().map(|s| s.name.as_str()).collect()
	}

	/// Options of the named section, or `None` if there is no such section.
	pub fn get_section(&self, name: &str) -> Option<&Section> {
		self.sections.iter().find(|s| s.name == name)
	}

	/// All sections carrying a `dispatch` option, as `(section, dispatch id)`.
	pub fn dispatch_list(&self) -> Vec<(&str, &str)> {
		self.sections
			.iter()
			.filter_map(|s| s.dispatch().map(|id| (s.name.as_str(), id)))
			.collect()
	}

	/// The first section (in declaration order) whose `dispatch` option equals `id`.
	pub fn get_dispatch(&self, id: &str) -> Option<(&str, &Section)> {
		self.sections
			.iter()
			.find(|s| s.dispatch() == Some(id))
			.map(|s| (s.name.as_str(), s))
	}

	/// Render a section as a human readable, `#`-prefixed block.
	///
	/// An unknown section renders as the header alone. Continuation lines of a
	/// multi-line value get their own `#` prefix.
	pub fn render_section(&self, name: &str) -> String {
		let mut out = format!("# Section : {}\n#===================\n", name);
		if let Some(section) = self.get_section(name) {
			for (key, value) in section.iter() {
				let mut lines = value.split('\n');
				let first = lines.next().unwrap_or_default();
				let _ = writeln!(out, "#  - option {} : {}", key, first);
				for line in lines {
					let _ = writeln!(out, "#      {}", line);
				}
			}
		}
		out
	}

	/// Print [`ConfigStore::render_section`] to stdout.
	pub fn print_section(&self, name: &str) {
		println!("{}", self.render_section(name));
	}

	/// Derive the logging configuration from the `logging` section.
	pub fn logging_config(&self) -> Result<LoggingConfig> {
		let section = self
			.get_section(LOGGING_SECTION)
			.ok_or_else(|| ConfigError::MissingSection {
				section: LOGGING_SECTION.to_string(),
			})?;
		Ok(LoggingConfig::from_section(section))
	}
}
