//! mapdeck - game map catalog
//!
//! # Commands
//!
//! - `mapdeck list` - Scan the map folders and print every playable game
//! - `mapdeck show <game>` - Print details of one game and its map resources
//! - `mapdeck roots [--save]` - Print which folders are scanned, optionally
//!   writing the effective settings to `config.toml`
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=mapdeck_core=debug`) for more detail, or
//! pass `--verbose`.

use anyhow::Result;
use clap::{Parser, Subcommand};

use mapdeck_core::CancellationToken;
use mapdeck_library::commands::{self, CommandContext, ScanArgs, list, roots, show};

/// mapdeck - find and list playable game maps
#[derive(Parser, Debug)]
#[command(name = "mapdeck")]
#[command(about = "Find and list playable game maps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    scan: ScanArgs,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the map folders and print the catalog
    List(list::ListArgs),

    /// Show one game's details and map resources
    Show(show::ShowArgs),

    /// Print the folders that are scanned for maps
    Roots(roots::RootsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // In-flight sources finish; nothing new is dispatched.
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Interrupted, finishing sources already being scanned...");
        handler_token.cancel();
    }) {
        tracing::warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let ctx = CommandContext::new(&cli.scan, commands::interaction_for(&cli.scan), token)?;

    match cli.command {
        Commands::List(args) => list::execute(&ctx, args),
        Commands::Show(args) => show::execute(&ctx, args),
        Commands::Roots(args) => roots::execute(&ctx, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_json() {
        let cli = Cli::try_parse_from(["mapdeck", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::List(list::ListArgs { json: true })));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mapdeck",
            "show",
            "pacific",
            "--root",
            "/opt/game",
            "--max-wait",
            "30",
            "--no-prompt",
            "-v",
        ])
        .unwrap();
        assert!(matches!(&cli.command, Commands::Show(args) if args.game == "pacific"));
        assert_eq!(cli.scan.root, Some(PathBuf::from("/opt/game")));
        assert_eq!(cli.scan.max_wait, Some(30));
        assert!(cli.scan.no_prompt);
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_roots_save() {
        let cli = Cli::try_parse_from(["mapdeck", "roots", "--save", "--user-maps", "/srv/maps"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Roots(roots::RootsArgs { save: true })));
        assert_eq!(cli.scan.user_maps, Some(PathBuf::from("/srv/maps")));
    }

    #[test]
    fn test_show_requires_game() {
        assert!(Cli::try_parse_from(["mapdeck", "show"]).is_err());
    }
}
