//! Filtering and pagination over a cached result list.

use crate::types::{AnalysisRequest, ImageRecord};

/// Records whose title, alt text or description contain `term`,
/// case-insensitively. An empty term keeps everything.
pub fn filter_records(records: &[ImageRecord], term: &str) -> Vec<ImageRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.haystack().contains(&needle))
        .cloned()
        .collect()
}

/// The 1-based `page` of `page_size` records.
///
/// Pages before the first clamp to offset 0; a page past the end, or a
/// non-positive page size, is empty.
pub fn paginate(records: &[ImageRecord], page: i64, page_size: i64) -> Vec<ImageRecord> {
    if page_size <= 0 {
        return Vec::new();
    }

    let offset = page_size.saturating_mul(page.saturating_sub(1)).max(0);
    let Ok(offset) = usize::try_from(offset) else {
        return Vec::new();
    };
    if offset >= records.len() {
        return Vec::new();
    }

    let end = offset
        .saturating_add(usize::try_from(page_size).unwrap_or(usize::MAX))
        .min(records.len());
    records[offset..end].to_vec()
}

/// Apply a request's search or pagination to `records`.
///
/// A search term (even empty) returns every match unpaginated.
pub fn select(records: &[ImageRecord], request: &AnalysisRequest) -> Vec<ImageRecord> {
    match request.search {
        Some(ref term) => filter_records(records, term),
        None => paginate(records, request.page, request.page_size),
    }
}
