//! `mapdeck roots` - where maps are read from

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use mapdeck_core::app::config;
use mapdeck_core::library::MapRootsProvider;

use super::CommandContext;

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootsArgs {
    /// Write the effective settings, flags included, to the config file
    #[arg(long)]
    pub save: bool,
}

pub fn execute(ctx: &CommandContext, args: RootsArgs) -> Result<()> {
    let roots = ctx.config.roots();
    match &ctx.config_path {
        Some(path) => println!("Config:     {}", describe(path)),
        None => println!("Config:     (no config directory on this platform)"),
    }
    match &roots.user {
        Some(path) => println!("User maps:  {}", describe(path)),
        None => println!("User maps:  (none)"),
    }
    match &roots.default {
        Some(path) => println!("Bundled:    {}", describe(path)),
        None => println!("Bundled:    (none)"),
    }

    if args.save {
        let path = ctx
            .config_path
            .as_deref()
            .context("No config directory on this platform; pass --config")?;
        config::save_to(&ctx.config, path)?;
        println!("Saved settings to {}", path.display());
    }
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ScanArgs;
    use mapdeck_core::CancellationToken;
    use mapdeck_core::library::AutoDecline;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(args: &ScanArgs) -> CommandContext {
        CommandContext::new(args, Arc::new(AutoDecline), CancellationToken::new()).unwrap()
    }

    #[test]
    fn test_save_writes_flags_into_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nworker_threads = 2\n").unwrap();

        let args = ScanArgs {
            config: Some(path.clone()),
            user_maps: Some(PathBuf::from("/srv/maps")),
            max_wait: Some(60),
            ..ScanArgs::default()
        };
        execute(&context(&args), RootsArgs { save: true }).unwrap();

        let saved = config::load_from(&path).unwrap();
        assert_eq!(saved.paths.user_maps_dir, Some(PathBuf::from("/srv/maps")));
        assert_eq!(saved.scan.max_wait_secs, 60);
        assert_eq!(saved.scan.worker_threads, Some(2));
    }

    #[test]
    fn test_without_save_leaves_config_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let args = ScanArgs {
            config: Some(path.clone()),
            root: Some(PathBuf::from("/opt/game")),
            ..ScanArgs::default()
        };
        execute(&context(&args), RootsArgs::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
