/// Name of the section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Option name that marks a section as a dispatch entry.
pub const DISPATCH_OPTION: &str = "dispatch";

/// A named group of options from the configuration file.
///
/// Options keep the order in which they were declared. Setting an option that
/// already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
	/// Section name as written between the brackets.
	pub name: String,

	/// Option names and values in declaration order.
	pub options: Vec<(String, String)>,
}

impl Section {
	pub fn new(name: impl Into<String>) -> Self {
		Section {
			name: name.into(),
			options: Vec::new(),
		}
	}

	/// Look up an option value by name.
	pub fn get(&self, option: &str) -> Option<&str> {
		self.options
			.iter()
			.find(|(key, _)| key == option)
			.map(|(_, value)| value.as_str())
	}

	/// Look up an option value, falling back to `default` when it is absent.
	pub fn get_or<'a>(&'a self, option: &str, default: &'a str) -> &'a str {
		self.get(option).unwrap_or(default)
	}

	pub fn contains(&self, option: &str) -> bool {
		self.get(option).is_some()
	}

	/// Set an option. Last write wins; the first declaration keeps its position.
	pub fn set(&mut self, option: impl Into<String>, value: impl Into<String>) {
		let option = option.into();
		let value = value.into();
		match self.options.iter_mut().find(|(key, _)| *key == option) {
			Some(slot) => slot.1 = value,
			None => self.options.push((option, value)),
		}
	}

	/// Iterate over `(option, value)` pairs in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.options
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.options.len()
	}

	pub fn is_empty(&self) -> bool {
		self.options.is_empty()
	}

	/// The dispatch identifier of this section, if it is a dispatch entry.
	pub fn dispatch(&self) -> Option<&str> {
		self.get(DISPATCH_OPTION)
	}
}
