use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// File name looked up by discovery.
pub const DEFAULT_CONFIG_NAME: &str = "dispytch.conf";

/// Environment variable the CLI reads as the default for `--config`.
pub const ENV_CONFIG_PATH: &str = "DISPYTCH_CONFIG";

/// Locations searched for `dispytch.conf` when no explicit path is given.
///
/// The search order is:
/// 1. `<cwd>/dispytch.conf`
/// 2. `<user config dir>/dispytch/dispytch.conf`
/// 3. `/etc/dispytch/dispytch.conf` (Unix only)
pub fn candidate_paths(cwd: &Path) -> Vec<PathBuf> {
	let mut candidates = vec![cwd.join(DEFAULT_CONFIG_NAME)];

	if let Some(user_config) = user_config_path() {
		candidates.push(user_config);
	}

	if cfg!(unix) {
		candidates.push(Path::new("/etc/dispytch").join(DEFAULT_CONFIG_NAME));
	}

	candidates
}

/// Resolve the configuration file to load.
///
/// An explicit path always wins and is returned unchecked; loading reports a
/// missing file. Otherwise the first existing candidate is used.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
	if let Some(path) = explicit {
		return Ok(path.to_path_buf());
	}

	let candidates = candidate_paths(cwd);
	if let Some(found) = candidates.iter().find(|path| path.is_file()) {
		return Ok(found.clone());
	}

	Err(ConfigError::ConfigNotFound {
		path: candidates
			.into_iter()
			.next()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME)),
	})
}

/// Get the path to the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("dispytch").join(DEFAULT_CONFIG_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_explicit_path_wins() {
		let temp_dir = tempfile::tempdir().unwrap();
		std::fs::write(temp_dir.path().join(DEFAULT_CONFIG_NAME), "[a]\n").unwrap();

		let explicit = Path::new("/somewhere/else.conf");
		let resolved = resolve_config_path(Some(explicit), temp_dir.path()).unwrap();

		assert_eq!(resolved, explicit);
	}

	#[test]
	fn test_cwd_candidate_found() {
		let temp_dir = tempfile::tempdir().unwrap();
		let config_path = temp_dir.path().join(DEFAULT_CONFIG_NAME);
		std::fs::write(&config_path, "[a]\n").unwrap();

		let resolved = resolve_config_path(None, temp_dir.path()).unwrap();

		assert_eq!(resolved, config_path);
	}

	#[test]
	fn test_candidates_start_with_cwd() {
		let cwd = Path::new("/srv/app");
		let candidates = candidate_paths(cwd);

		assert_eq!(candidates[0], cwd.join(DEFAULT_CONFIG_NAME));
		assert!(candidates.iter().all(|p| p.ends_with(DEFAULT_CONFIG_NAME)));
	}

	#[test]
	fn test_user_config_path() {
		if let Some(path) = user_config_path() {
			assert!(path.ends_with("dispytch/dispytch.conf"));
		}
	}
}
