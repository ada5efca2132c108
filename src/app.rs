//! Command-line parsing and command routing.

use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use crate::commands;
use crate::logging;

/// A terminal voice-memo recorder
#[derive(Parser)]
#[command(name = "voxmemo")]
#[command(version)]
#[command(about = "Record voice memos, save them to a memo server and play them back")]
#[command(long_about = "Record voice memos, save them to a memo server and play them back.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used by default.\n\nEXAMPLES:\n    # Open the recorder\n    $ voxmemo\n\n    # Print the memos stored on the server\n    $ voxmemo list\n\n    # Pick an input device, then set audio.device in the config\n    $ voxmemo list-devices\n    $ voxmemo config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxmemo/voxmemo.toml\n    Logs:               ~/.local/state/voxmemo/voxmemo.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive recorder (default)
    ///
    /// Record, preview, name and save memos, and play back saved ones.
    #[command(visible_alias = "r")]
    Run,

    /// Print the recordings stored on the memo server
    #[command(visible_alias = "ls")]
    List {
        /// Print the raw filenames as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// audio.device in voxmemo.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   voxmemo completions bash > voxmemo.bash
    ///   voxmemo completions zsh > _voxmemo
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the command selected on the command line.
///
/// # Errors
/// - If logging or configuration cannot be initialized
/// - If the selected command fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxmemo", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            if let Err(e) = commands::handle_list_devices() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        Some(Commands::Logs) => {
            if let Err(e) = commands::handle_logs() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging()?;
    tracing::debug!("voxmemo {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None | Some(Commands::Run) => commands::handle_run().await?,
        Some(Commands::List { json }) => commands::handle_list(json).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
