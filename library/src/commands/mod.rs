//! Command implementations
//!
//! Every command shares [`ScanArgs`] (global flags layered over
//! `config.toml`) and runs through a [`CommandContext`].

pub mod list;
pub mod roots;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use mapdeck_core::app::config;
use mapdeck_core::library::{AutoDecline, Interaction, MapRootsProvider};
use mapdeck_core::{CancellationToken, Config, ScanCoordinator, ScanReport, XmlDescriptorParser};

/// Flags accepted by every command. Each one overrides `config.toml`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    /// Read settings from this file instead of the default config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Installation root; bundled maps are read from `<root>/maps`
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Folder with user-installed maps
    #[arg(long, global = true, value_name = "DIR")]
    pub user_maps: Option<PathBuf>,

    /// Seconds to wait for slow sources before showing partial results
    #[arg(long, global = true, value_name = "SECS")]
    pub max_wait: Option<u64>,

    /// Number of scan worker threads
    #[arg(long, global = true, value_name = "N")]
    pub workers: Option<usize>,

    /// Never ask about corrupt maps; keep them
    #[arg(long, global = true)]
    pub no_prompt: bool,
}

impl ScanArgs {
    /// Layer the flags over `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.paths.root_dir = Some(root.clone());
        }
        if let Some(user_maps) = &self.user_maps {
            config.paths.user_maps_dir = Some(user_maps.clone());
        }
        if let Some(secs) = self.max_wait {
            config.scan.max_wait_secs = secs;
        }
        if let Some(workers) = self.workers {
            config.scan.worker_threads = Some(workers);
        }
        if self.no_prompt {
            config.scan.prompt_on_corrupt = false;
        }
    }
}

/// Everything a command needs to run a scan.
pub struct CommandContext {
    pub config: Config,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    pub interaction: Arc<dyn Interaction>,
    pub token: CancellationToken,
}

impl CommandContext {
    /// Load configuration (an explicit `--config` must exist and parse),
    /// then apply the flags.
    pub fn new(
        args: &ScanArgs,
        interaction: Arc<dyn Interaction>,
        token: CancellationToken,
    ) -> Result<Self> {
        let (mut config, config_path) = match &args.config {
            Some(path) => (config::load_from(path)?, Some(path.clone())),
            None => (config::load(), config::config_path()),
        };
        args.apply(&mut config);
        Ok(Self {
            config,
            config_path,
            interaction,
            token,
        })
    }

    /// Scan the configured roots.
    pub fn scan(&self) -> ScanReport {
        let coordinator = ScanCoordinator::new(
            Arc::new(XmlDescriptorParser::new()),
            self.interaction.clone(),
        )
        .with_options(self.config.scan_options());
        let report = coordinator.scan(&self.config.roots(), &self.token);

        if report.timed_out {
            eprintln!(
                "warning: gave up on {} slow source(s); the list may be incomplete",
                report.dispatched - report.finished
            );
        }
        if self.token.is_cancelled() {
            eprintln!("warning: scan interrupted; the list may be incomplete");
        }
        report
    }
}

/// Dialog front end for the given flags.
pub fn interaction_for(args: &ScanArgs) -> Arc<dyn Interaction> {
    if args.no_prompt {
        return Arc::new(AutoDecline);
    }
    #[cfg(feature = "native-dialogs")]
    {
        Arc::new(crate::dialogs::NativeDialogs)
    }
    #[cfg(not(feature = "native-dialogs"))]
    {
        Arc::new(crate::terminal::TerminalInteraction::stdio())
    }
}
