//! Citation numbering for discovered sources.
//!
//! A registry lives for exactly one analysis request. Ids start at 1 and are
//! handed out in first-encounter order, keyed by the source link. The
//! registry is a plain `&mut self` structure: callers feed it from one
//! sequential traversal after all concurrent lookups have finished.

use crate::types::Source;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CitationRegistry {
    ids: HashMap<String, u32>,
    /// First-seen source per id; index is `id - 1`
    entries: Vec<Source>,
}

impl CitationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the citation id for this source's link, assigning the next id
    /// if the link has not been seen. Sources without a link get `None`.
    pub fn assign(&mut self, source: &Source) -> Option<u32> {
        if !source.is_citable() {
            return None;
        }
        let link = source.link.trim();

        if let Some(id) = self.ids.get(link) {
            return Some(*id);
        }

        let id = self.next_id();
        let mut stored = source.clone();
        stored.citation_id = Some(id);
        self.ids.insert(link.to_string(), id);
        self.entries.push(stored);

        debug!("Assigned citation [{}] to {}", id, link);
        Some(id)
    }

    /// Id already assigned to a link, if any
    pub fn get(&self, link: &str) -> Option<u32> {
        self.ids.get(link.trim()).copied()
    }

    /// Id the next new link will receive
    pub fn next_id(&self) -> u32 {
        self.entries.len() as u32 + 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the registry, yielding `(id, source)` in ascending id order
    pub fn export(self) -> Vec<(u32, Source)> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(idx, source)| (idx as u32 + 1, source))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(link: &str) -> Source {
        Source::new(format!("title {}", link), link, "snippet")
    }

    #[test]
    fn test_assign_is_idempotent_per_link() {
        let mut registry = CitationRegistry::new();
        let first = registry.assign(&src("https://example.org/a"));
        assert_eq!(first, Some(1));
        assert_eq!(registry.next_id(), 2);

        let again = registry.assign(&src("https://example.org/a"));
        assert_eq!(again, Some(1));
        assert_eq!(registry.next_id(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_links_get_increasing_ids() {
        let mut registry = CitationRegistry::new();
        let ids: Vec<Option<u32>> = ["https://b", "https://a", "https://c", "https://a"]
            .iter()
            .map(|l| registry.assign(&src(l)))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(2)]);
    }

    #[test]
    fn test_blank_link_never_assigned() {
        let mut registry = CitationRegistry::new();
        assert_eq!(registry.assign(&src("")), None);
        assert_eq!(registry.assign(&src("   ")), None);
        assert!(registry.is_empty());
        assert_eq!(registry.next_id(), 1);
    }

    #[test]
    fn test_link_identity_ignores_surrounding_whitespace() {
        let mut registry = CitationRegistry::new();
        assert_eq!(registry.assign(&src("https://x ")), Some(1));
        assert_eq!(registry.assign(&src("https://x")), Some(1));
        assert_eq!(registry.get(" https://x"), Some(1));
    }

    #[test]
    fn test_export_keeps_first_seen_source() {
        let mut registry = CitationRegistry::new();
        registry.assign(&Source::new("First", "https://dup", "one"));
        registry.assign(&src("https://other"));
        registry.assign(&Source::new("Second", "https://dup", "two"));

        let exported = registry.export();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].0, 1);
        assert_eq!(exported[0].1.title, "First");
        assert_eq!(exported[0].1.citation_id, Some(1));
        assert_eq!(exported[1].0, 2);
        assert_eq!(exported[1].1.link, "https://other");
    }
}
