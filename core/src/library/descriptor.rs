//! Descriptor document parsing
//!
//! The catalog depends only on the [`DescriptorParser`] trait and its
//! three-way failure classification. [`XmlDescriptorParser`] is the parser
//! the application ships with.

use anyhow::Context;
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use mapdeck_shared::{Descriptor, EngineVersion, MAX_DESCRIPTOR_BYTES, engine_version};

use super::GameUri;

/// Why a descriptor document did not produce a [`Descriptor`].
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The document needs a newer engine than the one running.
    #[error("requires engine version {required}, running {current}")]
    EngineVersion {
        required: EngineVersion,
        current: EngineVersion,
    },
    /// The document is not well-formed.
    #[error("line {line}, column {column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Parses the document a [`GameUri`] points at.
///
/// Implementations are shared by every scan worker.
pub trait DescriptorParser: Send + Sync {
    fn parse(&self, uri: &GameUri) -> Result<Descriptor, DescriptorError>;

    /// Parse a document already read from `uri`.
    ///
    /// The default ignores `bytes` and reads the document again.
    fn parse_bytes(&self, uri: &GameUri, _bytes: &[u8]) -> Result<Descriptor, DescriptorError> {
        self.parse(uri)
    }
}

/// Parser for `<game>` XML documents.
///
/// Only the catalog-facing parts of the document are read: the `<info>`
/// element, the engine requirement, player names and the `notes` property.
#[derive(Debug, Clone)]
pub struct XmlDescriptorParser {
    engine: EngineVersion,
    max_bytes: u64,
}

impl Default for XmlDescriptorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDescriptorParser {
    pub fn new() -> Self {
        Self {
            engine: engine_version(),
            max_bytes: MAX_DESCRIPTOR_BYTES,
        }
    }

    /// Parser that checks requirements against `engine` instead of the
    /// running engine version.
    pub fn with_engine_version(engine: EngineVersion) -> Self {
        Self {
            engine,
            ..Self::new()
        }
    }

    /// Parse an in-memory document.
    pub fn parse_document(&self, text: &str) -> Result<Descriptor, DescriptorError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options).map_err(|e| {
            let pos = e.pos();
            DescriptorError::Malformed {
                line: pos.row,
                column: pos.col,
                message: e.to_string(),
            }
        })?;

        let game = doc.root_element();
        if !game.has_tag_name("game") {
            return Err(anyhow::anyhow!(
                "expected <game> root element, found <{}>",
                game.tag_name().name()
            )
            .into());
        }

        if let Some(required) = child(game, "triplea").and_then(|n| n.attribute("minimumVersion")) {
            let required: EngineVersion = required
                .parse()
                .with_context(|| format!("invalid minimumVersion '{}'", required))?;
            if !self.engine.satisfies(&required) {
                return Err(DescriptorError::EngineVersion {
                    required,
                    current: self.engine.clone(),
                });
            }
        }

        let info = child(game, "info").context("missing <info> element")?;
        let name = info
            .attribute("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .context("<info> has no name")?;

        let players = child(game, "playerList")
            .map(|list| {
                list.children()
                    .filter(|n| n.has_tag_name("player"))
                    .filter_map(|n| n.attribute("name"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Descriptor {
            name: name.to_string(),
            version: info.attribute("version").map(str::to_string),
            minimum_engine_version: child(game, "triplea")
                .and_then(|n| n.attribute("minimumVersion"))
                .map(str::to_string),
            players,
            notes: notes(game),
        })
    }
}

impl DescriptorParser for XmlDescriptorParser {
    fn parse(&self, uri: &GameUri) -> Result<Descriptor, DescriptorError> {
        let bytes = uri.read_bytes(self.max_bytes)?;
        self.parse_bytes(uri, &bytes)
    }

    fn parse_bytes(&self, uri: &GameUri, bytes: &[u8]) -> Result<Descriptor, DescriptorError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(anyhow::anyhow!(
                "{} is larger than {} bytes",
                uri,
                self.max_bytes
            )
            .into());
        }
        let text =
            std::str::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", uri))?;
        self.parse_document(text)
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn notes(game: Node) -> Option<String> {
    let property = child(game, "propertyList")?
        .children()
        .find(|n| n.has_tag_name("property") && n.attribute("name") == Some("notes"))?;
    let text = match property.attribute("value") {
        Some(value) => value.to_string(),
        None => child(property, "value")?.text()?.to_string(),
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GLOBAL_WAR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE game SYSTEM "game.dtd">
<game>
  <info name="Global War" version="3.1"/>
  <triplea minimumVersion="1.8"/>
  <playerList>
    <player name="Germans" optional="false"/>
    <player name="Russians" optional="false"/>
    <alliance player="Germans" alliance="Axis"/>
  </playerList>
  <propertyList>
    <property name="Low Luck" value="false" editable="true"/>
    <property name="notes">
      <value><![CDATA[ A world at war. ]]></value>
    </property>
  </propertyList>
</game>
"#;

    fn parser() -> XmlDescriptorParser {
        XmlDescriptorParser::with_engine_version(EngineVersion::new([1, 9]))
    }

    // =============================================================
    // Successful parses
    // =============================================================

    #[test]
    fn test_parse_full_document() {
        let descriptor = parser().parse_document(GLOBAL_WAR).unwrap();
        assert_eq!(descriptor.name, "Global War");
        assert_eq!(descriptor.version.as_deref(), Some("3.1"));
        assert_eq!(descriptor.minimum_engine_version.as_deref(), Some("1.8"));
        assert_eq!(descriptor.players, vec!["Germans", "Russians"]);
        assert_eq!(descriptor.notes.as_deref(), Some("A world at war."));
    }

    #[test]
    fn test_parse_minimal_document() {
        let descriptor = parser()
            .parse_document("\u{feff}<game><info name=' Tiny '/></game>")
            .unwrap();
        assert_eq!(descriptor, Descriptor::new("Tiny"));
    }

    #[test]
    fn test_notes_from_value_attribute() {
        let doc = r#"<game><info name="A"/><propertyList>
            <property name="notes" value="Short notes"/></propertyList></game>"#;
        let descriptor = parser().parse_document(doc).unwrap();
        assert_eq!(descriptor.notes.as_deref(), Some("Short notes"));
    }

    #[test]
    fn test_parse_reads_through_uri() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("global war.xml");
        std::fs::write(&path, GLOBAL_WAR).unwrap();
        let descriptor = parser().parse(&GameUri::from_file(&path)).unwrap();
        assert_eq!(descriptor.name, "Global War");
    }

    #[test]
    fn test_parse_bytes_uses_given_bytes() {
        let uri = GameUri::archive_entry(
            std::path::Path::new("/nonexistent/global war.zip"),
            "games/global_war.xml",
        );
        let descriptor = parser().parse_bytes(&uri, GLOBAL_WAR.as_bytes()).unwrap();
        assert_eq!(descriptor.name, "Global War");
    }

    #[test]
    fn test_parse_bytes_limits() {
        let uri = GameUri::from_file(std::path::Path::new("/maps/a/games/a.xml"));
        let small = XmlDescriptorParser {
            max_bytes: 8,
            ..parser()
        };
        assert!(matches!(
            small.parse_bytes(&uri, GLOBAL_WAR.as_bytes()),
            Err(DescriptorError::Other(_))
        ));
        assert!(matches!(
            parser().parse_bytes(&uri, &[0xff, 0xfe, 0x00]),
            Err(DescriptorError::Other(_))
        ));
    }

    // =============================================================
    // Failure classification
    // =============================================================

    #[test]
    fn test_newer_engine_required() {
        let doc = r#"<game><info name="Future"/><triplea minimumVersion="2.0"/></game>"#;
        match parser().parse_document(doc) {
            Err(DescriptorError::EngineVersion { required, current }) => {
                assert_eq!(required.to_string(), "2.0");
                assert_eq!(current.parts(), &[1, 9]);
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_reports_position() {
        let doc = "<game>\n  <info name=\"Broken\">\n</game>";
        match parser().parse_document(doc) {
            Err(DescriptorError::Malformed { line, column, .. }) => {
                assert_eq!(line, 3);
                assert!(column >= 1);
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_root_is_other() {
        let result = parser().parse_document("<map><info name='A'/></map>");
        assert!(matches!(result, Err(DescriptorError::Other(_))));
    }

    #[test]
    fn test_missing_name_is_other() {
        let result = parser().parse_document("<game><info name='  '/></game>");
        assert!(matches!(result, Err(DescriptorError::Other(_))));
        let result = parser().parse_document("<game/>");
        assert!(matches!(result, Err(DescriptorError::Other(_))));
    }

    #[test]
    fn test_bad_minimum_version_is_other() {
        let doc = r#"<game><info name="A"/><triplea minimumVersion="one"/></game>"#;
        assert!(matches!(
            parser().parse_document(doc),
            Err(DescriptorError::Other(_))
        ));
    }

    #[test]
    fn test_missing_file_is_other() {
        let uri = GameUri::from_file(std::path::Path::new("/nonexistent/games/a.xml"));
        assert!(matches!(parser().parse(&uri), Err(DescriptorError::Other(_))));
    }
}
