use crate::config::types::{DEFAULT_SECTION, Section};
use crate::error::{ConfigError, Result, SyntaxIssue, SyntaxIssueKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static SECTION_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\[(?P<header>[^\]]+)\]").expect("valid section regex"));

static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?P<option>[^:=\s][^:=]*)\s*(?P<vi>[:=])\s*(?P<value>.*)$")
		.expect("valid option regex")
});

/// Knobs for the INI parser.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
	/// Reject repeated `[section]` headers instead of merging them.
	pub strict: bool,
}

impl Default for ParseOptions {
	fn default() -> Self {
		ParseOptions { strict: true }
	}
}

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Vec<Section>> {
	parse_config_file_with(path, ParseOptions::default())
}

/// Parse a config file from the given path with explicit parser options.
pub fn parse_config_file_with(path: &Path, options: ParseOptions) -> Result<Vec<Section>> {
	if !path.is_file() {
		return Err(ConfigError::ConfigNotFound {
			path: path.to_path_buf(),
		});
	}

	let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
		std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
			ConfigError::ConfigNotFound {
				path: path.to_path_buf(),
			}
		}
		_ => ConfigError::ConfigReadError {
			path: path.to_path_buf(),
			source,
		},
	})?;

	parse_config_str_with(&content, path, options)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Vec<Section>> {
	parse_config_str_with(content, path, ParseOptions::default())
}

#[derive(Clone, Copy)]
enum Cursor {
	Default,
	Section(usize),
}

/// Parse INI text into sections, in declaration order.
///
/// Options of the `DEFAULT` section are inherited by every other section that
/// does not set them itself; `DEFAULT` is not returned as a section.
pub fn parse_config_str_with(
	content: &str,
	path: &Path,
	options: ParseOptions,
) -> Result<Vec<Section>> {
	let mut defaults = Section::new(DEFAULT_SECTION);
	let mut sections: Vec<Section> = Vec::new();
	let mut cursor: Option<Cursor> = None;
	let mut current_option: Option<String> = None;
	let mut errors = Vec::new();

	for (index, raw) in content.lines().enumerate() {
		let line_no = index + 1;
		let line = raw.strip_suffix('\r').unwrap_or(raw);

		if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
			continue;
		}

		// Continuation of the previous option's value
		if line.starts_with(char::is_whitespace)
			&& let (Some(cursor), Some(option)) = (cursor, current_option.as_deref())
		{
			let section = match cursor {
				Cursor::Default => &mut defaults,
				Cursor::Section(i) => &mut sections[i],
			};
			let mut value = section.get(option).unwrap_or_default().to_string();
			value.push('\n');
			value.push_str(line.trim());
			section.set(option, value);
			continue;
		}

		if let Some(caps) = SECTION_RE.captures(line) {
			let name = &caps["header"];
			current_option = None;

			if name == DEFAULT_SECTION {
				cursor = Some(Cursor::Default);
				continue;
			}

			match sections.iter().position(|s| s.name == name) {
				Some(existing) => {
					if options.strict {
						errors.push(SyntaxIssue {
							line: line_no,
							kind: SyntaxIssueKind::DuplicateSection,
							text: line.to_string(),
						});
					} else {
						tracing::warn!(
							target: "dispytch::config",
							section = name,
							line = line_no,
							"merging repeated section"
						);
					}
					cursor = Some(Cursor::Section(existing));
				}
				None => {
					sections.push(Section::new(name));
					cursor = Some(Cursor::Section(sections.len() - 1));
				}
			}
			continue;
		}

		let Some(current) = cursor else {
			return Err(ConfigError::ConfigSyntaxError {
				path: path.to_path_buf(),
				errors: vec![SyntaxIssue {
					line: line_no,
					kind: SyntaxIssueKind::MissingSectionHeader,
					text: line.to_string(),
				}],
			});
		};

		match OPTION_RE.captures(line) {
			Some(caps) => {
				let key = caps["option"].trim_end().to_lowercase();
				let value = clean_value(&caps["value"]);
				let section = match current {
					Cursor::Default => &mut defaults,
					Cursor::Section(i) => &mut sections[i],
				};
				section.set(key.clone(), value);
				current_option = Some(key);
			}
			None => {
				errors.push(SyntaxIssue {
					line: line_no,
					kind: SyntaxIssueKind::MalformedLine,
					text: line.to_string(),
				});
			}
		}
	}

	if !errors.is_empty() {
		return Err(ConfigError::ConfigSyntaxError {
			path: path.to_path_buf(),
			errors,
		});
	}

	for section in &mut sections {
		for (key, value) in defaults.iter() {
			if !section.contains(key) {
				section.set(key, value);
			}
		}
	}

	Ok(sections)
}

/// Strip an inline `;` comment (only when preceded by whitespace) and
/// surrounding whitespace. A bare `""` stands for the empty string.
fn clean_value(value: &str) -> String {
	let mut value = value;
	if let Some(pos) = value.find(';')
		&& pos > 0
		&& value[..pos].ends_with(char::is_whitespace)
	{
		value = &value[..pos];
	}

	let value = value.trim();
	if value == "\"\"" {
		String::new()
	} else {
		value.to_string()
	}
}
