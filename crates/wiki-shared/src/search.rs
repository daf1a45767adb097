use crate::models::Document;

/// Documents whose title contains `query`, ignoring case, in source order.
/// An empty query matches everything.
pub fn filter_by_title<'a>(documents: &'a [Document], query: &str) -> Vec<&'a Document> {
    let needle = query.to_lowercase();
    documents
        .iter()
        .filter(|doc| doc.title.to_lowercase().contains(&needle))
        .collect()
}
