//! Init command - write a configuration file with every setting.

use zonemap::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
///
/// An existing file is re-saved with missing keys filled in; values already
/// set are kept.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();

    let config = ConfigFile::load()?;
    config.save()?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();
    println!("Edit this file or use 'zonemap config set <section.key> <value>'.");
    println!("Set RUST_LOG to override [logging] level for a single run.");
    Ok(())
}
