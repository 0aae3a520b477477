use std::collections::HashSet;

use insight_core::Source;

use crate::WebReference;

pub const DEFAULT_SOURCE_TITLE: &str = "Source";

/// Maps grounding references to sources, deduplicated by uri.
///
/// Empty strings count as absent. A reference with neither title nor uri is
/// skipped; otherwise the title defaults to [`DEFAULT_SOURCE_TITLE`] and the
/// uri to `""`. The first reference for a uri wins and order is preserved.
pub fn collect_sources(references: &[WebReference]) -> Vec<Source> {
    let mut seen = HashSet::new();
    references
        .iter()
        .filter_map(|reference| {
            let title = non_empty(reference.title.as_deref());
            let uri = non_empty(reference.uri.as_deref());
            if title.is_none() && uri.is_none() {
                return None;
            }
            Some(Source {
                title: title.unwrap_or(DEFAULT_SOURCE_TITLE).to_string(),
                uri: uri.unwrap_or_default().to_string(),
            })
        })
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
