//! Game name resolution from user queries
//!
//! Lets the command line accept `pac` or `PACIFIC` for "Pacific":
//! - Exact match
//! - Case-insensitive match
//! - Case-insensitive prefix match (if unique)
//! - Typo suggestions using Levenshtein distance

use thiserror::Error;

use super::CatalogEntry;

const DISTANCE_THRESHOLD: usize = 3;
const MAX_SUGGESTIONS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct NameResolutionError {
    pub message: String,
    /// Close or ambiguous candidates, best first. May be empty.
    pub suggestions: Vec<String>,
}

/// Pick the catalog entry a user query refers to.
pub fn resolve_game_name<'a>(
    query: &str,
    entries: &'a [CatalogEntry],
) -> Result<&'a CatalogEntry, NameResolutionError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(NameResolutionError {
            message: "Empty game name".to_string(),
            suggestions: Vec::new(),
        });
    }

    if let Some(entry) = entries.iter().find(|e| e.name() == query) {
        return Ok(entry);
    }

    let lower = query.to_lowercase();
    if let Some(entry) = entries.iter().find(|e| e.name().to_lowercase() == lower) {
        return Ok(entry);
    }

    let prefixed: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| e.name().to_lowercase().starts_with(&lower))
        .collect();

    match prefixed.as_slice() {
        [entry] => Ok(*entry),
        [] => Err(NameResolutionError {
            message: format!("Game '{}' not found", query),
            suggestions: similar_names(&lower, entries),
        }),
        many => Err(NameResolutionError {
            message: format!("Game '{}' matches {} games", query, many.len()),
            suggestions: many.iter().map(|e| e.name().to_string()).collect(),
        }),
    }
}

fn similar_names(lower_query: &str, entries: &[CatalogEntry]) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = entries
        .iter()
        .map(|e| (levenshtein(lower_query, &e.name().to_lowercase()), e.name()))
        .filter(|(distance, _)| *distance <= DISTANCE_THRESHOLD)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Edit distance, computed with two rolling rows.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
