//! Yes/no prompts on the terminal

use std::io::{self, BufRead, BufReader, Write};
use std::sync::{Mutex, PoisonError};

use mapdeck_core::library::{Interaction, Severity};

/// Asks questions on an output stream and reads answers from an input
/// stream. Anything other than `y`/`yes` (including end of input) is "no".
pub struct TerminalInteraction {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl TerminalInteraction {
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Prompt on stderr, answer on stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }

    fn write_block(&self, text: &str) -> io::Result<()> {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        output.write_all(text.as_bytes())?;
        output.flush()
    }
}

impl Interaction for TerminalInteraction {
    fn confirm(&self, message: &str, title: &str) -> bool {
        if let Err(e) = self.write_block(&format!("\n== {} ==\n{}\nRemove? [y/N] ", title, message)) {
            tracing::warn!("Failed to write prompt: {}", e);
            return false;
        }
        let mut answer = String::new();
        let read = self
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_line(&mut answer);
        match read {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Failed to read answer: {}", e);
                false
            }
        }
    }

    fn notify(&self, message: &str, title: &str, severity: Severity) {
        let marker = match severity {
            Severity::Info => "",
            Severity::Error => "error: ",
        };
        if let Err(e) = self.write_block(&format!("{}{}: {}\n", marker, title, message)) {
            tracing::warn!("Failed to write notification: {}", e);
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    /// Output sink the test can read back.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_yes_answers() {
        for answer in ["y\n", "YES\n", "  Yes  \n"] {
            let terminal = TerminalInteraction::new(Cursor::new(answer), Captured::default());
            assert!(terminal.confirm("Remove broken.zip?", "Corrupt Map File Found"));
        }
    }

    #[test]
    fn test_other_answers_are_no() {
        for answer in ["n\n", "\n", "", "maybe\n"] {
            let terminal = TerminalInteraction::new(Cursor::new(answer), Captured::default());
            assert!(!terminal.confirm("Remove broken.zip?", "Corrupt Map File Found"));
        }
    }

    #[test]
    fn test_prompt_and_notification_text() {
        let out = Captured::default();
        let terminal = TerminalInteraction::new(Cursor::new("n\n"), out.clone());
        terminal.confirm("Remove /maps/broken.zip?", "Corrupt Map File Found");
        terminal.notify("Unable to delete file", "File Removal Result", Severity::Error);

        let text = out.text();
        assert!(text.contains("== Corrupt Map File Found =="));
        assert!(text.contains("/maps/broken.zip"));
        assert!(text.contains("error: File Removal Result: Unable to delete file"));
    }
}
