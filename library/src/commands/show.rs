//! `mapdeck show` - details of one game

use anyhow::Result;
use clap::Args;

use mapdeck_core::library::{MapResourceLoader, MapSession, resolve_game_name};
use mapdeck_shared::{GAMES_ENTRY_PREFIX, WELL_KNOWN_MAP_RESOURCES};

use super::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Game name, or a unique case-insensitive prefix of one
    pub game: String,
}

pub fn execute(ctx: &CommandContext, args: ShowArgs) -> Result<()> {
    let catalog = ctx.scan().into_catalog();
    let entry = match resolve_game_name(&args.game, catalog.entries()) {
        Ok(entry) => entry,
        Err(e) => {
            if !e.suggestions.is_empty() {
                eprintln!("Did you mean:");
                for suggestion in &e.suggestions {
                    eprintln!("  - {}", suggestion);
                }
            }
            return Err(e.into());
        }
    };

    let descriptor = entry.descriptor();
    println!("Name:     {}", descriptor.name);
    if let Some(version) = &descriptor.version {
        println!("Version:  {}", version);
    }
    if let Some(required) = &descriptor.minimum_engine_version {
        println!("Requires: engine {}", required);
    }
    println!("Origin:   {} maps", entry.origin().as_str());
    println!("Location: {}", entry.uri());
    if !descriptor.players.is_empty() {
        println!("Players:  {}", descriptor.players.join(", "));
    }

    let mut session = MapSession::new();
    session.switch_context(MapResourceLoader::for_entry(entry)?);
    if let Some(loader) = session.loader() {
        println!("Map root: {}", loader.root().display());
    }
    for name in WELL_KNOWN_MAP_RESOURCES.iter().copied().chain([GAMES_ENTRY_PREFIX]) {
        let found = if session.resource(name).is_some() { "yes" } else { "no" };
        println!("  {:<18} {}", name, found);
    }

    if let Some(notes) = &descriptor.notes {
        println!();
        println!("{}", notes);
    }
    Ok(())
}
