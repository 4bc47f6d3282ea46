//! Native message dialogs

use mapdeck_core::library::{Interaction, Severity};

/// Presents prompts as native message boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDialogs;

impl Interaction for NativeDialogs {
    fn confirm(&self, message: &str, title: &str) -> bool {
        rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_level(rfd::MessageLevel::Warning)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes
    }

    fn notify(&self, message: &str, title: &str, severity: Severity) {
        let level = match severity {
            Severity::Info => rfd::MessageLevel::Info,
            Severity::Error => rfd::MessageLevel::Error,
        };
        rfd::MessageDialog::new()
            .set_title(title)
            .set_description(message)
            .set_level(level)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}
