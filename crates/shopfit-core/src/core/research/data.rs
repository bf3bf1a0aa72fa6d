use super::records::{MobileToolRecord, SafetyFinding, WorkflowPattern};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// A research entry, or a derived rule, that was dropped instead of failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SkippedRecord {
    pub section: String,
    pub index: usize,
    pub reason: String,
}

impl SkippedRecord {
    pub fn new(section: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            index,
            reason: reason.into(),
        }
    }
}

/// Versioned research parameters feeding the constraint factory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResearchData {
    pub version: String,
    pub safety: Vec<SafetyFinding>,
    pub workflow: Vec<WorkflowPattern>,
    pub mobile: Vec<MobileToolRecord>,
    /// Entries of the source document that could not be read.
    pub skipped: Vec<SkippedRecord>,
}

impl ResearchData {
    pub fn load(path: &Path) -> Result<Self, ResearchError> {
        let content = std::fs::read_to_string(path).map_err(|e| ResearchError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ResearchError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ResearchError> {
        let mut table: toml::Table = toml::from_str(content).map_err(|e| ResearchError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let mut skipped = Vec::new();
        let version = match table.remove("version") {
            Some(toml::Value::String(v)) => v,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let safety = read_section(&mut table, "safety", &mut skipped);
        let workflow = read_workflow(&mut table, &mut skipped);
        let mobile = read_section(&mut table, "mobile", &mut skipped);

        for key in table.keys() {
            debug!(key = %key, origin, "Ignoring unknown research section.");
        }
        if !skipped.is_empty() {
            warn!(
                count = skipped.len(),
                origin, "Skipped malformed research records."
            );
        }

        Ok(Self {
            version,
            safety,
            workflow,
            mobile,
            skipped,
        })
    }
}

fn read_section<T: DeserializeOwned>(
    table: &mut toml::Table,
    section: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<T> {
    match table.remove(section) {
        None => Vec::new(),
        Some(value) => read_entries(value, section, skipped),
    }
}

fn read_entries<T: DeserializeOwned>(
    value: toml::Value,
    section: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<T> {
    let entries = match value {
        toml::Value::Array(entries) => entries,
        other => {
            skipped.push(SkippedRecord::new(
                section,
                0,
                format!("expected an array of tables, found {}", other.type_str()),
            ));
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry.try_into::<T>() {
            Ok(record) => records.push(record),
            Err(e) => skipped.push(SkippedRecord::new(section, index, e.to_string())),
        }
    }
    records
}

/// Workflow patterns are read rule by rule, so one bad adjacency rule or distance band
/// drops only itself and not the rest of its project type.
fn read_workflow(table: &mut toml::Table, skipped: &mut Vec<SkippedRecord>) -> Vec<WorkflowPattern> {
    let entries = match table.remove("workflow") {
        None => return Vec::new(),
        Some(toml::Value::Array(entries)) => entries,
        Some(other) => {
            skipped.push(SkippedRecord::new(
                "workflow",
                0,
                format!("expected an array of tables, found {}", other.type_str()),
            ));
            return Vec::new();
        }
    };

    let mut patterns = Vec::with_capacity(entries.len());
    for (index, mut entry) in entries.into_iter().enumerate() {
        let (adjacency, bands) = match entry.as_table_mut() {
            Some(fields) => (fields.remove("adjacency"), fields.remove("distance-bands")),
            None => (None, None),
        };
        let mut pattern = match entry.try_into::<WorkflowPattern>() {
            Ok(pattern) => pattern,
            Err(e) => {
                skipped.push(SkippedRecord::new("workflow", index, e.to_string()));
                continue;
            }
        };
        let slug = pattern.slug();
        if let Some(value) = adjacency {
            pattern.adjacency = read_entries(value, &format!("workflow.{slug}.adjacency"), skipped);
        }
        if let Some(value) = bands {
            pattern.distance_bands =
                read_entries(value, &format!("workflow.{slug}.distance-bands"), skipped);
        }
        patterns.push(pattern);
    }
    patterns
}
