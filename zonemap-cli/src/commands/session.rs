//! Session command - interactive exploration driven by stdin.
//!
//! Commands, one per line:
//!
//! ```text
//! move <hash>      move the viewport, e.g. move #@53.07,8.80,15
//! show <category>  include a category in the zone
//! hide <category>  exclude a category from the zone
//! refresh          fetch the current viewport again
//! quit             finish pending work and exit
//! ```

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use zonemap::config::ConfigFile;
use zonemap::session::{MapSession, SessionCommand};
use zonemap::Category;

use super::common::{resolve_viewport, zone_summary};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the session command.
pub struct SessionArgs {
    pub view: String,
    pub input: Option<PathBuf>,
}

/// A parsed line of user input.
#[derive(Debug, PartialEq)]
pub enum InputLine {
    Command(SessionCommand),
    Quit,
    Blank,
}

/// Parse one input line.
pub fn parse_line(line: &str, config: &ConfigFile) -> Result<InputLine, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(InputLine::Blank);
    };
    let argument = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments to '{}'", verb));
    }

    let category = |arg: Option<&str>| -> Result<Category, String> {
        arg.ok_or_else(|| format!("'{}' needs a category", verb))?
            .parse()
    };

    match (verb.to_lowercase().as_str(), argument) {
        ("move", Some(hash)) => resolve_viewport(hash, config)
            .map(|v| InputLine::Command(SessionCommand::MoveTo(v)))
            .map_err(|e| e.to_string()),
        ("move", None) => Err("'move' needs a view hash like #@53.07,8.80,15".to_string()),
        ("show", arg) => Ok(InputLine::Command(SessionCommand::SetVisible(
            category(arg)?,
            true,
        ))),
        ("hide", arg) => Ok(InputLine::Command(SessionCommand::SetVisible(
            category(arg)?,
            false,
        ))),
        ("refresh", None) => Ok(InputLine::Command(SessionCommand::Refresh)),
        ("quit" | "exit", None) => Ok(InputLine::Quit),
        _ => Err(format!("unknown command '{}'", line.trim())),
    }
}

/// Run the session command.
pub fn run(args: SessionArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("session");
    let config = runner.config();

    let viewport = resolve_viewport(&args.view, config)?;
    let source = runner.entity_source(args.input.as_deref())?;

    runner.block_on(async {
        let mut session =
            MapSession::new(source, config.marker_builder(), config.session_config());
        let mut zones = session.subscribe();
        let (command_tx, command_rx) = mpsc::channel(32);
        let shutdown = CancellationToken::new();

        println!("{}", session.move_to(viewport));

        let input = read_commands(command_tx, config, shutdown.clone());

        let printer_shutdown = shutdown.clone();
        let printer = async move {
            loop {
                tokio::select! {
                    _ = printer_shutdown.cancelled() => break,
                    changed = zones.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let zone = zones.borrow_and_update().clone();
                        println!("{}", zone_summary(&zone));
                    }
                }
            }
        };

        let interrupt = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let session_loop = async {
            session.run(command_rx, shutdown.clone()).await;
            shutdown.cancel();
        };

        tokio::join!(session_loop, input, printer);
    });

    Ok(())
}

/// Forward parsed stdin lines to the session until quit, EOF or shutdown.
async fn read_commands(
    commands: mpsc::Sender<SessionCommand>,
    config: &ConfigFile,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("{}", CliError::Input(e));
                break;
            }
        };

        match parse_line(&line, config) {
            Ok(InputLine::Command(command)) => {
                debug!(command = ?command, "User command");
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Ok(InputLine::Quit) => break,
            Ok(InputLine::Blank) => {}
            Err(message) => eprintln!("{}", message),
        }
    }
    // Dropping the sender lets the session settle and return
}
