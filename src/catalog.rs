//! Catalog input: object descriptors loaded by an external collaborator and
//! handed to this crate as plain records.

/// One object's catalog descriptor: an opaque identifier plus its two TLE
/// lines. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub object_id: String,
    pub tle_line1: String,
    pub tle_line2: String,
}

impl CatalogEntry {
    pub fn new(
        object_id: impl Into<String>,
        tle_line1: impl Into<String>,
        tle_line2: impl Into<String>,
    ) -> Self {
        CatalogEntry {
            object_id: object_id.into(),
            tle_line1: tle_line1.into(),
            tle_line2: tle_line2.into(),
        }
    }
}

/// Sentinel identifier filtered before allocation.
pub const UNKNOWN_OBJECT_ID: &str = "UNKNOWN";

/// Filter out catalog entries whose identifier is the literal string
/// `"UNKNOWN"`. Downstream indices reference only the retained entries.
pub fn filter_catalog(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    entries
        .into_iter()
        .filter(|e| e.object_id != UNKNOWN_OBJECT_ID)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_unknown_entries() {
        let entries = vec![
            CatalogEntry::new("2023-047A", "l1", "l2"),
            CatalogEntry::new("UNKNOWN", "l1", "l2"),
            CatalogEntry::new("2023-047D", "l1", "l2"),
        ];
        let filtered = filter_catalog(entries);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.object_id != UNKNOWN_OBJECT_ID));
    }
}
