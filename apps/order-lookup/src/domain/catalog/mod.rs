//! Catalog Matching
//!
//! The catalog is an ordered, immutable list of known item names fixed at
//! server start. Matching is a pure substring containment test: a query
//! matches every entry that *contains* the query text, in catalog order.
//!
//! # Design
//!
//! The catalog is constructed once at startup and shared read-only
//! (`Arc<Catalog>`) across all concurrent sessions, so the match path
//! needs no synchronization.

/// The default catalog served when no override is configured.
pub const DEFAULT_ITEMS: [&str; 10] = [
    "banana",
    "apple",
    "orange",
    "grape",
    "red apple",
    "kiwi",
    "mango",
    "pear",
    "cherry",
    "green apple",
];

/// Ordered, read-only list of known item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<String>,
}

impl Catalog {
    /// Create a catalog from an ordered list of item names.
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Number of entries in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Collect every entry containing `query` as a substring, in catalog
    /// order. Case-sensitive.
    ///
    /// An empty query matches every entry. That is specified behavior,
    /// preserved for compatibility, not an accident of the containment
    /// test.
    #[must_use]
    pub fn matches(&self, query: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.contains(query))
            .map(String::as_str)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS.iter().map(ToString::to_string).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    #[test_case("apple", &["apple", "red apple", "green apple"]; "substring matches in catalog order")]
    #[test_case("banana", &["banana"]; "exact entry")]
    #[test_case("an", &["banana", "orange", "mango"]; "short needle hits several entries")]
    #[test_case("zzz", &[]; "no match yields empty sequence")]
    #[test_case("APPLE", &[]; "matching is case sensitive")]
    fn containment_matching(query: &str, expected: &[&str]) {
        let catalog = Catalog::default();
        assert_eq!(catalog.matches(query), expected);
    }

    #[test]
    fn empty_query_matches_full_catalog_in_order() {
        let catalog = Catalog::default();
        assert_eq!(catalog.matches(""), DEFAULT_ITEMS);
    }

    #[test]
    fn empty_catalog_matches_nothing() {
        let catalog = Catalog::new(vec![]);
        assert!(catalog.matches("").is_empty());
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn matching_is_idempotent() {
        let catalog = Catalog::default();
        assert_eq!(catalog.matches("apple"), catalog.matches("apple"));
    }

    proptest! {
        /// An entry appears in the match set iff it contains the query.
        #[test]
        fn entry_matched_iff_it_contains_query(query in "[a-z ]{0,12}") {
            let catalog = Catalog::default();
            let matched = catalog.matches(&query);
            for entry in catalog.entries() {
                prop_assert_eq!(
                    matched.contains(&entry.as_str()),
                    entry.contains(&query)
                );
            }
        }

        /// The match set preserves catalog order.
        #[test]
        fn match_set_preserves_catalog_order(query in "[a-z ]{0,12}") {
            let catalog = Catalog::default();
            let matched = catalog.matches(&query);
            let positions: Vec<usize> = matched
                .iter()
                .filter_map(|m| catalog.entries().iter().position(|e| e == m))
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
