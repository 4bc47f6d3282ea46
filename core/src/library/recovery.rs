//! Corrupt archive recovery
//!
//! When an archive lists a descriptor whose bytes cannot be read, the user
//! is asked whether to delete the archive. Each archive is asked about at
//! most once per scan.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashSet;

use super::{InteractionHandle, InteractionRequest, InteractionResponse, Severity};

const CORRUPT_TITLE: &str = "Corrupt Map File Found";
const RESULT_TITLE: &str = "File Removal Result";

/// What happened to a corrupt archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The user declined (or prompting is disabled); the file stays.
    Kept,
    Deleted,
    /// The user agreed but the file could not be removed.
    DeleteFailed,
    /// This archive was already handled during the current scan.
    AlreadyPrompted,
    /// The interaction context was gone; treated as "no".
    Unavailable,
}

#[derive(Clone)]
pub struct CorruptionRecoveryGate {
    interaction: InteractionHandle,
    prompt: bool,
    prompted: Arc<Mutex<HashSet<PathBuf>>>,
}

impl CorruptionRecoveryGate {
    pub fn new(interaction: InteractionHandle) -> Self {
        Self {
            interaction,
            prompt: true,
            prompted: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// With prompts disabled every corrupt archive is kept without asking.
    pub fn with_prompts(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Ask whether to delete `archive`, and delete it if the user agrees.
    pub fn handle(&self, archive: &Path) -> RecoveryOutcome {
        let path = std::path::absolute(archive).unwrap_or_else(|_| archive.to_path_buf());
        if !self.prompt {
            tracing::info!(path = %path.display(), "Keeping corrupt map archive");
            return RecoveryOutcome::Kept;
        }
        let first = self
            .prompted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.clone());
        if !first {
            return RecoveryOutcome::AlreadyPrompted;
        }

        let question = InteractionRequest::Confirm {
            message: format!(
                "Could not parse map file correctly, would you like to remove it?\n{}\n(You may see this error message again if you keep the file)",
                path.display()
            ),
            title: CORRUPT_TITLE.to_string(),
        };
        match self.interaction.present_and_await(question) {
            Ok(InteractionResponse::Yes) => {}
            Ok(_) => return RecoveryOutcome::Kept,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not ask about corrupt map archive");
                return RecoveryOutcome::Unavailable;
            }
        }

        let (outcome, message, severity) = match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted corrupt map archive");
                (
                    RecoveryOutcome::Deleted,
                    "File was deleted successfully.".to_string(),
                    Severity::Info,
                )
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete corrupt map archive");
                (
                    RecoveryOutcome::DeleteFailed,
                    format!(
                        "Unable to delete file, please remove it by hand:\n{}",
                        path.display()
                    ),
                    Severity::Error,
                )
            }
        };
        let result = InteractionRequest::Notify {
            message,
            title: RESULT_TITLE.to_string(),
            severity,
        };
        if let Err(e) = self.interaction.present_and_await(result) {
            tracing::debug!(error = %e, "Removal result not shown");
        }
        outcome
    }
}
