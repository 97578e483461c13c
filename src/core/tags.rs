use crate::domain::model::VersionTag;
use crate::domain::ports::TagListing;
use std::collections::HashSet;

impl TagListing {
    /// Unwraps a plain or paged listing into an ordered tag sequence.
    pub fn into_tags(self) -> Vec<VersionTag> {
        match self {
            TagListing::Plain(tags) => tags,
            TagListing::Paged { results, .. } => results,
        }
    }
}

/// Unwraps the listing, drops repeated tags (first occurrence wins) and caps the
/// result at `limit` entries.
pub fn normalize_tags(listing: TagListing, limit: usize) -> Vec<VersionTag> {
    let mut seen = HashSet::new();
    listing
        .into_tags()
        .into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .take(limit)
        .collect()
}
