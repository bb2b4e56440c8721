//! Complexity hotspot query over raw scc language groups.

use crate::types::{FileRecord, HotspotRecord, LanguageGroup};

/// Files whose complexity is at least `threshold` (inclusive), most complex
/// first. Equal complexities are ordered by filename so output is stable
/// across runs.
pub fn complexity_hotspots(groups: &[LanguageGroup], threshold: u64) -> Vec<HotspotRecord> {
    let mut hot: Vec<&FileRecord> = groups
        .iter()
        .flat_map(|group| group.files.iter())
        .filter(|file| file.complexity >= threshold)
        .collect();

    hot.sort_by(|a, b| {
        b.complexity
            .cmp(&a.complexity)
            .then_with(|| a.filename.cmp(&b.filename))
    });

    hot.into_iter().map(HotspotRecord::from).collect()
}
