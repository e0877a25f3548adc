//! Config command - read and edit the configuration file by `section.key`.

use std::path::Path;

use clap::Subcommand;
use zonemap::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key as section.key (e.g. zones.buffer_radius_m)
        key: String,
    },

    /// Validate and store one value
    Set {
        /// Key as section.key (e.g. zones.buffer_radius_m)
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting, marking values that differ from the default
    List,

    /// Print the configuration file location
    Path,
}

/// Run a config subcommand against the user's configuration file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    for line in execute(command, &config_file_path())? {
        println!("{}", line);
    }
    Ok(())
}

/// Apply `command` to the file at `path` and return the lines to print.
fn execute(command: ConfigCommands, path: &Path) -> Result<Vec<String>, CliError> {
    let lines = match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let value = key.get(&ConfigFile::load_from(path)?);
            vec![display_value(&value).to_string()]
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load_from(path)?;
            let previous = key.get(&config);
            key.set(&mut config, &value)?;
            config.save_to(path)?;
            vec![format!(
                "{}: {} -> {}",
                key.name(),
                display_value(&previous),
                display_value(&key.get(&config))
            )]
        }
        ConfigCommands::List => list_lines(&ConfigFile::load_from(path)?),
        ConfigCommands::Path => vec![path.display().to_string()],
    };
    Ok(lines)
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "unknown key '{}'; run 'zonemap config list' for the available keys",
            key
        ))
    })
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// INI-style listing grouped by section.
fn list_lines(config: &ConfigFile) -> Vec<String> {
    let defaults = ConfigFile::default();
    let mut lines = Vec::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(format!("[{}]", section));
        }
        let value = key.get(config);
        let marker = if value != key.get(&defaults) { "  *" } else { "" };
        lines.push(format!(
            "{} = {}{}",
            key.key_name(),
            display_value(&value),
            marker
        ));
    }
    lines
}
