//! Data model for scc output and the views derived from it.
//!
//! Input structs deserialize the PascalCase keys scc emits; everything
//! serializes back out in snake_case.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Hotspot threshold used when a caller does not pass one.
pub const DEFAULT_HOTSPOT_THRESHOLD: u64 = 20;

/// Aggregate metrics for one language, as emitted by `scc -f json --by-file`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(deserialize = "PascalCase"))]
pub struct LanguageGroup {
    pub name: String,
    pub lines: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
    pub complexity: u64,
    pub bytes: u64,
    /// Number of files scc counted for this language
    pub count: u64,
    #[serde(deserialize_with = "null_as_empty")]
    pub files: Vec<FileRecord>,
}

/// Per-file metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all(deserialize = "PascalCase"))]
pub struct FileRecord {
    pub filename: String,
    pub location: String,
    pub language: String,
    pub lines: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
    pub complexity: u64,
    pub bytes: u64,
}

/// scc marshals an empty file list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Totals across every language group of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_lines: u64,
    pub total_code: u64,
    pub total_comment: u64,
    pub total_blank: u64,
    pub total_complexity: u64,
    pub total_bytes: u64,
    pub file_count: u64,
    pub language_count: u64,
}

/// One row of the per-language table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMetrics {
    pub lines: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
    pub complexity: u64,
    pub bytes: u64,
    pub files: u64,
}

impl LanguageMetrics {
    fn absorb(&mut self, group: &LanguageGroup) {
        self.lines += group.lines;
        self.code += group.code;
        self.comment += group.comment;
        self.blank += group.blank;
        self.complexity += group.complexity;
        self.bytes += group.bytes;
        self.files += group.count;
    }
}

/// Normalized view of one scc run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub by_language: BTreeMap<String, LanguageMetrics>,
    /// File records in the order scc emitted them
    pub files: Vec<FileRecord>,
}

impl AnalysisResult {
    /// Build the summary, language table and flat file list from raw groups.
    pub fn from_groups(groups: &[LanguageGroup]) -> Self {
        let mut summary = Summary::default();
        let mut by_language: BTreeMap<String, LanguageMetrics> = BTreeMap::new();
        let mut files = Vec::new();

        for group in groups {
            summary.total_lines += group.lines;
            summary.total_code += group.code;
            summary.total_comment += group.comment;
            summary.total_blank += group.blank;
            summary.total_complexity += group.complexity;
            summary.total_bytes += group.bytes;

            by_language
                .entry(group.name.clone())
                .or_default()
                .absorb(group);

            files.extend(group.files.iter().cloned());
        }

        summary.file_count = files.len() as u64;
        summary.language_count = by_language.len() as u64;

        Self {
            summary,
            by_language,
            files,
        }
    }
}

/// Narrow projection of a [`FileRecord`] used by the hotspot query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub filename: String,
    pub location: String,
    pub language: String,
    pub complexity: u64,
    pub lines: u64,
    pub code: u64,
}

impl From<&FileRecord> for HotspotRecord {
    fn from(file: &FileRecord) -> Self {
        Self {
            filename: file.filename.clone(),
            location: file.location.clone(),
            language: file.language.clone(),
            complexity: file.complexity,
            lines: file.lines,
            code: file.code,
        }
    }
}
