//! Parsed game descriptor.

use serde::{Deserialize, Serialize};

/// The structured result of parsing one game-definition document.
///
/// Only the fields the catalog and its consumers need are kept; the full
/// game model is built later, when a game is actually loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Game name shown in the catalog. Also the descriptor's identity.
    pub name: String,
    /// Version string declared by the map author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Minimum engine version the document declares, as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_engine_version: Option<String>,
    /// Player (nation) names in declaration order.
    #[serde(default)]
    pub players: Vec<String>,
    /// Free-form notes from the document's `notes` property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            minimum_engine_version: None,
            players: Vec::new(),
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_omits_missing_fields() {
        let descriptor = Descriptor::new("Global War");
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["name"], "Global War");
        assert!(json.get("version").is_none());
        assert_eq!(json["players"], serde_json::json!([]));
    }

    #[test]
    fn test_json_defaults_on_read() {
        let descriptor: Descriptor = serde_json::from_str(r#"{"name": "Pact of Steel"}"#).unwrap();
        assert_eq!(descriptor, Descriptor::new("Pact of Steel"));
    }
}
