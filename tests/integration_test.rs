#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::Path;

const SAMPLE: &str = r#"
# dispytch sample configuration

[DEFAULT]
timeout = 30

[users]
dispatch = users
module = handlers.users

[groups]
dispatch = groups
module = handlers.groups
timeout = 5

[database]
url = postgres://localhost/dispytch
"#;

fn dispytch_cmd() -> assert_cmd::Command {
	let mut cmd = assert_cmd::Command::cargo_bin("dispytch").unwrap();
	cmd.env_remove("DISPYTCH_CONFIG");
	cmd
}

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
	let path = dir.join("dispytch.conf");
	fs::write(&path, content).unwrap();
	path
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	dispytch_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("Inspect the dispytch configuration"));
}

#[test]
fn test_version_flag() {
	dispytch_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("dispytch"));
}

#[test]
fn test_no_args_shows_help() {
	dispytch_cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// Load failure tests
// ============================================================================

#[test]
fn test_missing_config_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();
	let missing = temp_dir.path().join("nope.conf");

	dispytch_cmd()
		.args(["sections", "--config"])
		.arg(&missing)
		.assert()
		.code(1)
		.stdout(predicate::str::contains("not found or not readable"));
}

#[test]
fn test_missing_config_from_env_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();

	dispytch_cmd()
		.arg("sections")
		.env("DISPYTCH_CONFIG", temp_dir.path().join("nope.conf"))
		.assert()
		.code(1)
		.stdout(predicate::str::contains("nope.conf"));
}

#[test]
fn test_directory_as_config_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();

	dispytch_cmd()
		.args(["sections", "--config"])
		.arg(temp_dir.path())
		.assert()
		.code(1)
		.stdout(predicate::str::contains("not found or not readable"));
}

#[test]
fn test_invalid_utf8_config_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("dispytch.conf");
	fs::write(&config_path, b"[a]\nkey = \xff\xfe\n").unwrap();

	dispytch_cmd()
		.arg("sections")
		.current_dir(temp_dir.path())
		.assert()
		.code(1)
		.stdout(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_huge_format_width_is_reported_not_fatal() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(
		temp_dir.path(),
		"[logging]\nconsole = yes\nformat = %(message)99999999999999999999999s\n\n[a]\n",
	);

	dispytch_cmd()
		.args(["logging", "--check"])
		.current_dir(temp_dir.path())
		.assert()
		.code(1)
		.stderr(predicate::str::contains("Invalid log format"));

	dispytch_cmd()
		.args(["sections", "--log"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("logging\na\n"))
		.stderr(predicate::str::contains("logging not installed"));
}

#[test]
fn test_option_outside_section_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "orphan = 1\n[a]\nkey = value\n");

	dispytch_cmd()
		.arg("sections")
		.current_dir(temp_dir.path())
		.assert()
		.code(1)
		.stdout(predicate::str::contains("File contains parsing errors"))
		.stdout(predicate::str::contains("line  1"));
}

#[test]
fn test_duplicate_section_exits_1() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "[a]\nx = 1\n[a]\ny = 2\n");

	dispytch_cmd()
		.arg("validate")
		.current_dir(temp_dir.path())
		.assert()
		.code(1)
		.stdout(predicate::str::contains("duplicate section"));
}

#[test]
fn test_duplicate_section_lenient() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "[a]\nx = 1\n[a]\ny = 2\n");

	dispytch_cmd()
		.args(["show", "a", "--lenient"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("#  - option x : 1"))
		.stdout(predicate::str::contains("#  - option y : 2"));
}

// ============================================================================
// Query commands
// ============================================================================

#[test]
fn test_sections_lists_declared_sections() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.arg("sections")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::eq("users\ngroups\ndatabase\n"));
}

#[test]
fn test_show_section() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.args(["show", "groups"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("# Section : groups"))
		.stdout(predicate::str::contains("#  - option module : handlers.groups"))
		.stdout(predicate::str::contains("#  - option timeout : 5"));
}

#[test]
fn test_show_inherits_defaults() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.args(["show", "users"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("#  - option timeout : 30"));
}

#[test]
fn test_show_missing_section() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.args(["show", "nope"])
		.current_dir(temp_dir.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("Section not found: nope"));
}

#[test]
fn test_dispatch_list() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.arg("dispatch")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("users = users"))
		.stdout(predicate::str::contains("groups = groups"))
		.stdout(predicate::str::contains("database").not());
}

#[test]
fn test_dispatch_lookup() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.args(["dispatch", "groups"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("[groups]"))
		.stdout(predicate::str::contains("module = handlers.groups"));
}

#[test]
fn test_dispatch_lookup_missing() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.args(["dispatch", "missing"])
		.current_dir(temp_dir.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("No section dispatches 'missing'"));
}

#[test]
fn test_explicit_config_path() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("custom.conf");
	fs::write(&config_path, "[only]\nkey = value\n").unwrap();

	dispytch_cmd()
		.arg("sections")
		.arg("--config")
		.arg(&config_path)
		.assert()
		.success()
		.stdout(predicate::eq("only\n"));
}

#[test]
fn test_validate() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.arg("validate")
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("3 sections, 2 dispatch entries"));
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn test_logging_console_json() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "[logging]\nlevel = info\nconsole = yes\n");

	let output = dispytch_cmd()
		.arg("logging")
		.current_dir(temp_dir.path())
		.output()
		.unwrap();
	assert!(output.status.success());

	let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
	assert_eq!(json["loggers"]["dispytch"]["level"], "INFO");
	assert_eq!(
		json["loggers"]["dispytch"]["handlers"],
		serde_json::json!(["null", "console"])
	);
	assert_eq!(json["loggers"]["dispytch"]["propagate"], false);
	assert_eq!(json["handlers"]["console"]["level"], "INFO");
	assert!(json["handlers"].get("file").is_none());
}

#[test]
fn test_logging_file_toml() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "[logging]\nfile = /tmp/x.log\n");

	dispytch_cmd()
		.args(["logging", "--format", "toml"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("/tmp/x.log"))
		.stdout(predicate::str::contains("propagate = false"))
		.stdout(predicate::str::contains("console").not());
}

#[test]
fn test_logging_missing_section_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), SAMPLE);

	dispytch_cmd()
		.arg("logging")
		.current_dir(temp_dir.path())
		.assert()
		.code(1)
		.stderr(predicate::str::contains("Missing required section: [logging]"));
}

#[test]
fn test_logging_check_rejects_bad_level() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(temp_dir.path(), "[logging]\nlevel = loud\nconsole = yes\n");

	dispytch_cmd()
		.args(["logging", "--check"])
		.current_dir(temp_dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_log_flag_writes_file_handler() {
	let temp_dir = tempfile::tempdir().unwrap();
	let log_path = temp_dir.path().join("dispytch.log");
	write_config(
		temp_dir.path(),
		&format!(
			"[logging]\nlevel = debug\nformat = %(levelname)s %(name)s %(message)s\nfile = {}\n\n[a]\nkey = value\n",
			log_path.to_string_lossy()
		),
	);

	dispytch_cmd()
		.args(["sections", "--log"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("logging\na\n"));

	let logged = fs::read_to_string(&log_path).unwrap();
	assert!(logged.contains("DEBUG dispytch::logging logging installed"));
}

#[test]
fn test_log_flag_console_handler() {
	let temp_dir = tempfile::tempdir().unwrap();
	write_config(
		temp_dir.path(),
		"[logging]\nconsole = yes\nformat = <%(levelname)s> %(message)s\n",
	);

	dispytch_cmd()
		.args(["sections", "--log"])
		.current_dir(temp_dir.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("<DEBUG> logging installed"));
}
