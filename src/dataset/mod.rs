//! Project rows and the dataset reader.
//!
//! The matcher only needs an id and a block of text per row ([`CorpusItem`]).
//! [`Project`] is the concrete row type; columns it does not model are kept in
//! [`Project::extra`] so ranked output carries the whole row.

mod error;


pub use error::DatasetError;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// A row the matcher can embed.
pub trait CorpusItem {
    /// Stable unique identifier.
    fn item_id(&self) -> &str;

    /// Text fed to the encoder: `"{title} {objective} {topics}"`, missing
    /// fields as empty strings.
    fn corpus_text(&self) -> String;
}

/// One project row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<String>,

    /// Every other column (acronym, cluster, fundingScheme, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            objective: None,
            topics: None,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = Some(objective.into());
        self
    }

    pub fn with_topics(mut self, topics: impl Into<String>) -> Self {
        self.topics = Some(topics.into());
        self
    }
}

impl CorpusItem for Project {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn corpus_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or_default(),
            self.objective.as_deref().unwrap_or_default(),
            self.topics.as_deref().unwrap_or_default()
        )
    }
}

// Ids arrive as strings or numbers depending on the export.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "project id must be a string or number, got {}",
            other
        ))),
    }
}

/// Reads projects from a `.json` array or a `.jsonl` file, preserving order.
///
/// Blank lines in JSON lines input are skipped. Duplicate ids are rejected.
pub fn load_projects<P: AsRef<Path>>(path: P) -> Result<Vec<Project>, DatasetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let projects: Vec<Project> = match extension.as_deref() {
        Some("json") => {
            serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
                path: path.to_path_buf(),
                line: None,
                source,
            })?
        }
        Some("jsonl") | Some("ndjson") => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| DatasetError::Parse {
                    path: path.to_path_buf(),
                    line: Some(idx + 1),
                    source,
                })
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(DatasetError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    ensure_unique_ids(&projects)?;

    info!(path = %path.display(), projects = projects.len(), "Dataset loaded");
    Ok(projects)
}

/// Fails on the first id that appears twice.
pub fn ensure_unique_ids<T: CorpusItem>(items: &[T]) -> Result<(), DatasetError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.item_id()) {
            return Err(DatasetError::DuplicateId {
                id: item.item_id().to_string(),
            });
        }
    }
    Ok(())
}
