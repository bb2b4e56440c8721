//! Project-to-project comparison of scc summaries.
//!
//! Differences are signed and always read "B minus A", so a positive value
//! means the second project is larger.

use serde::{Deserialize, Serialize};

use crate::types::Summary;

/// Per-metric difference between two summaries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDiff {
    pub lines: i64,
    pub code: i64,
    pub complexity: i64,
    pub files: i64,
}

impl ProjectDiff {
    pub fn between(a: &Summary, b: &Summary) -> Self {
        Self {
            lines: delta(a.total_lines, b.total_lines),
            code: delta(a.total_code, b.total_code),
            complexity: delta(a.total_complexity, b.total_complexity),
            files: delta(a.file_count, b.file_count),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Full comparison result returned by the `compare` command
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectComparison {
    pub path_a: String,
    pub path_b: String,
    pub summary_a: Summary,
    pub summary_b: Summary,
    pub diff: ProjectDiff,
}

impl ProjectComparison {
    pub fn new(path_a: String, summary_a: Summary, path_b: String, summary_b: Summary) -> Self {
        let diff = ProjectDiff::between(&summary_a, &summary_b);
        Self {
            path_a,
            path_b,
            summary_a,
            summary_b,
            diff,
        }
    }
}

fn delta(a: u64, b: u64) -> i64 {
    (i128::from(b) - i128::from(a)).clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
