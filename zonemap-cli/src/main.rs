//! Zonemap CLI - consumption-ban exclusion zones on the command line
//!
//! Fetches ban-relevant places for a map view from Overpass (or a saved
//! response), dissolves their buffers into an exclusion zone and writes the
//! result as GeoJSON.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use zonemap::Category;

use commands::common::parse_category;
use commands::config::ConfigCommands;
use commands::session::SessionArgs;
use commands::zones::ZonesArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "zonemap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the exclusion zone for a view and write it as GeoJSON
    Zones {
        /// View hash: #@<lat>,<lon>,<zoom>
        #[arg(long, allow_hyphen_values = true)]
        view: String,

        /// Saved Overpass JSON response instead of the live API
        #[arg(long)]
        input: Option<PathBuf>,

        /// Category to leave out of the zone (repeatable)
        #[arg(long, value_parser = parse_category)]
        hide: Vec<Category>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Explore interactively; reads commands from stdin
    Session {
        /// Initial view hash: #@<lat>,<lon>,<zoom>
        #[arg(long, allow_hyphen_values = true)]
        view: String,

        /// Saved Overpass JSON response instead of the live API
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create the configuration file with defaults
    Init,
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Zones {
            view,
            input,
            hide,
            output,
        } => commands::zones::run(ZonesArgs {
            view,
            input,
            hide,
            output,
        }),
        Commands::Session { view, input } => commands::session::run(SessionArgs { view, input }),
        Commands::Config { command } => commands::config::run(command),
        Commands::Init => commands::init::run(),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_zones_with_hidden_categories() {
        let cli = Cli::try_parse_from([
            "zonemap",
            "zones",
            "--view",
            "#@53.07,8.80,15",
            "--hide",
            "sport",
            "--hide",
            "pedestrian",
        ])
        .unwrap();
        match cli.command {
            Commands::Zones { hide, output, .. } => {
                assert_eq!(hide, vec![Category::Sport, Category::Pedestrian]);
                assert!(output.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result = Cli::try_parse_from(["zonemap", "zones", "--view", "#@0,0,12", "--hide", "parks"]);
        assert!(result.is_err());
    }
}
