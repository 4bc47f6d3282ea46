//! On-disk map fixtures for pipeline tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use mapdeck_core::library::{Interaction, Severity};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Minimal well-formed descriptor named `name`.
pub fn descriptor(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE game SYSTEM "game.dtd">
<game>
  <info name="{}" version="1.0"/>
  <triplea minimumVersion="1.8"/>
  <playerList>
    <player name="Allies"/>
    <player name="Axis"/>
  </playerList>
</game>
"#,
        name
    )
}

/// `<root>/<map>/games/<file>` for each `(file, content)`.
pub fn map_dir(root: &Path, map: &str, games: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(map);
    fs::create_dir_all(dir.join("games")).unwrap();
    for (file, content) in games {
        fs::write(dir.join("games").join(file), content).unwrap();
    }
    dir
}

/// Zip with uncompressed entries, so content bytes can be found and damaged.
pub fn map_zip(path: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path.to_path_buf()
}

/// Flip one byte of `needle` inside the archive so its entry fails its
/// checksum while the listing stays intact.
pub fn damage(path: &Path, needle: &str) {
    let mut bytes = fs::read(path).unwrap();
    let at = bytes
        .windows(needle.len())
        .position(|w| w == needle.as_bytes())
        .expect("needle not found in archive");
    bytes[at] ^= 0x20;
    fs::write(path, bytes).unwrap();
}

/// A user that answers every question the same way, recording what was
/// asked and the name of the thread it was asked on.
pub struct ScriptedUser {
    answer: bool,
    delay: Duration,
    pub asked: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedUser {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            delay: Duration::ZERO,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Takes `delay` to answer each question.
    pub fn hesitating(answer: bool, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::answering(answer)
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap()
            .iter()
            .map(|(_, title, _)| title.clone())
            .collect()
    }

    pub fn thread_names(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap()
            .iter()
            .map(|(thread, _, _)| thread.clone())
            .collect()
    }

    fn record(&self, title: &str, message: &str) {
        let thread = thread::current().name().unwrap_or_default().to_string();
        self.asked
            .lock()
            .unwrap()
            .push((thread, title.to_string(), message.to_string()));
    }
}

impl Interaction for ScriptedUser {
    fn confirm(&self, message: &str, title: &str) -> bool {
        thread::sleep(self.delay);
        self.record(title, message);
        self.answer
    }

    fn notify(&self, message: &str, title: &str, _severity: Severity) {
        self.record(title, message);
    }
}
