use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use dispytch::config::{ConfigStore, ENV_CONFIG_PATH, ParseOptions, resolve_config_path};
use dispytch::logging::{LOGGING_SECTION, LoggingGuard, install, validate};
use dispytch::{ConfigError, EXIT_CFG_SYNTAX};

/// Exit code for lookups that found nothing.
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "dispytch")]
#[command(
	author,
	version,
	about = "Inspect the dispytch configuration file and the settings derived from it"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Path to dispytch.conf (searched in ./, the user config dir and /etc/dispytch otherwise)
	#[arg(long, short, global = true, env = ENV_CONFIG_PATH, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Merge repeated [section] headers instead of rejecting them
	#[arg(long, global = true)]
	lenient: bool,

	/// Install the logging configuration from the [logging] section
	#[arg(long, global = true)]
	log: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// List section names
	Sections,
	/// Print one section as a commented block
	Show {
		/// Section name
		section: String,
	},
	/// List dispatch entries, or show the section serving ID
	Dispatch {
		/// Dispatch identifier to look up
		id: Option<String>,
	},
	/// Print the logging configuration derived from the [logging] section
	Logging {
		/// Output format
		#[arg(long, value_enum, default_value_t = OutputFormat::Json)]
		format: OutputFormat,

		/// Also check that the level and message pattern are valid
		#[arg(long)]
		check: bool,
	},
	/// Load the configuration file and report whether it is valid
	Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
	Json,
	Toml,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	let store = match load_store(&cli) {
		Ok(store) => store,
		Err(e) if e.is_load_failure() => {
			println!("{}", e);
			return Ok(ExitCode::from(EXIT_CFG_SYNTAX));
		}
		Err(e) => return Err(e.into()),
	};

	let _guard = if cli.log { init_logging(&store) } else { None };

	match cli.command {
		Commands::Sections => handle_sections(&store),
		Commands::Show { section } => handle_show(&store, &section),
		Commands::Dispatch { id } => handle_dispatch(&store, id.as_deref()),
		Commands::Logging { format, check } => handle_logging(&store, format, check),
		Commands::Validate => handle_validate(&store),
	}
}

fn load_store(cli: &Cli) -> std::result::Result<ConfigStore, ConfigError> {
	let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
	let path = resolve_config_path(cli.config.as_deref(), &cwd)?;
	ConfigStore::load_with(
		&path,
		ParseOptions {
			strict: !cli.lenient,
		},
	)
}

/// Logging is best-effort: a broken [logging] section must not stop inspection.
fn init_logging(store: &ConfigStore) -> Option<LoggingGuard> {
	if store.get_section(LOGGING_SECTION).is_none() {
		return None;
	}

	match store.logging_config().and_then(|config| install(&config)) {
		Ok(guard) => Some(guard),
		Err(e) => {
			eprintln!("Warning: logging not installed: {}", e);
			None
		}
	}
}

fn handle_sections(store: &ConfigStore) -> Result<ExitCode> {
	for name in store.get_sections() {
		println!("{}", name);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_show(store: &ConfigStore, section: &str) -> Result<ExitCode> {
	if store.get_section(section).is_none() {
		eprintln!("Section not found: {}", section);
		return Ok(ExitCode::from(EXIT_NOT_FOUND));
	}

	store.print_section(section);
	Ok(ExitCode::SUCCESS)
}

fn handle_dispatch(store: &ConfigStore, id: Option<&str>) -> Result<ExitCode> {
	let Some(id) = id else {
		let entries = store.dispatch_list();
		if entries.is_empty() {
			println!("No dispatch entries.");
		}
		for (section, dispatch) in entries {
			println!("{} = {}", section, dispatch);
		}
		return Ok(ExitCode::SUCCESS);
	};

	match store.get_dispatch(id) {
		Some((name, section)) => {
			println!("[{}]", name);
			for (key, value) in section.iter() {
				println!("{} = {}", key, value);
			}
			Ok(ExitCode::SUCCESS)
		}
		None => {
			eprintln!("No section dispatches '{}'", id);
			Ok(ExitCode::from(EXIT_NOT_FOUND))
		}
	}
}

fn handle_logging(store: &ConfigStore, format: OutputFormat, check: bool) -> Result<ExitCode> {
	let config = store.logging_config().with_context(|| {
		format!(
			"Failed to build logging configuration from {}",
			store.path().display()
		)
	})?;

	if check {
		validate(&config).context("Invalid logging configuration")?;
	}

	let rendered = match format {
		OutputFormat::Json => serde_json::to_string_pretty(&config)
			.context("Failed to render logging configuration as JSON")?,
		OutputFormat::Toml => toml::to_string_pretty(&config)
			.context("Failed to render logging configuration as TOML")?,
	};
	println!("{}", rendered);
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(store: &ConfigStore) -> Result<ExitCode> {
	println!(
		"{} is valid ({} sections, {} dispatch entries)",
		store.path().display(),
		store.get_sections().len(),
		store.dispatch_list().len()
	);
	Ok(ExitCode::SUCCESS)
}
