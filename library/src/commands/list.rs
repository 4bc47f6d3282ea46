//! `mapdeck list` - print the catalog

use anyhow::{Context, Result};
use clap::Args;

use mapdeck_core::CatalogModel;

use super::CommandContext;

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let catalog = ctx.scan().into_catalog();
    if args.json {
        let json = serde_json::to_string_pretty(catalog.entries())
            .context("Failed to serialize catalog")?;
        println!("{}", json);
    } else if catalog.is_empty() {
        println!("No games found.");
    } else {
        print!("{}", render_table(&catalog));
    }
    Ok(())
}

/// One line per game: name, version, origin root, URI.
pub fn render_table(catalog: &CatalogModel) -> String {
    let width = catalog
        .iter()
        .map(|entry| entry.name().chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in catalog {
        out.push_str(&format!(
            "{:<width$}  {:<8}  {:<7}  {}\n",
            entry.name(),
            entry.descriptor().version.as_deref().unwrap_or("-"),
            entry.origin().as_str(),
            entry.uri(),
            width = width
        ));
    }
    out
}
