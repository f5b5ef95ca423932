//! Taxonomy rules for catalog records.
use crate::catalog::RawRecord;

use super::Filter;

/// Department root every kept item must belong to.
pub const GENERAL_ROOT_ID: &str = "cat00000";

/// Sub-branch (music and movies) whose items are never kept.
pub const RESTRICTED_BRANCH_ID: &str = "abcat0600000";

/// Checks that a record is usable as a training example:
///
/// - it has a non-empty name,
/// - it has a category path whose leaf has an identifier,
/// - its path starts at [Taxonomy::root_id],
/// - its sub-branch is not [Taxonomy::restricted_id].
///
/// A path with a single segment has no sub-branch and is not restricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    root_id: String,
    restricted_id: String,
}

impl Taxonomy {
    pub fn new(root_id: String, restricted_id: String) -> Self {
        Self {
            root_id,
            restricted_id,
        }
    }

    pub fn root_id(&self) -> &str {
        self.root_id.as_ref()
    }

    pub fn restricted_id(&self) -> &str {
        self.restricted_id.as_ref()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(
            GENERAL_ROOT_ID.to_string(),
            RESTRICTED_BRANCH_ID.to_string(),
        )
    }
}

impl Filter<&RawRecord> for Taxonomy {
    fn detect(&self, record: &RawRecord) -> bool {
        let has_name = record.name().map_or(false, |name| !name.is_empty());
        let has_leaf_id = record.leaf().and_then(|leaf| leaf.id()).is_some();
        let in_root = record.root().and_then(|root| root.id()) == Some(self.root_id());
        let restricted =
            record.branch().and_then(|branch| branch.id()) == Some(self.restricted_id());

        has_name && has_leaf_id && in_root && !restricted
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::CategoryPathSegment;

    use super::*;

    fn seg(id: Option<&str>, name: Option<&str>) -> CategoryPathSegment {
        CategoryPathSegment::new(id.map(String::from), name.map(String::from))
    }

    fn record(name: Option<&str>, ids: &[Option<&str>]) -> RawRecord {
        let path = ids.iter().map(|id| seg(*id, Some("some name"))).collect();
        RawRecord::new(name.map(String::from), path)
    }

    #[test]
    fn valid() {
        let r = record(
            Some("Wireless Mouse"),
            &[Some("cat00000"), Some("abcat0100000"), Some("abcat0101000")],
        );
        assert!(Taxonomy::default().detect(&r));
    }

    #[test]
    fn restricted_branch() {
        let r = record(
            Some("Abbey Road"),
            &[Some("cat00000"), Some("abcat0600000"), Some("abcat0601000")],
        );
        assert!(!Taxonomy::default().detect(&r));
    }

    #[test]
    fn restricted_branch_whatever_the_rest() {
        let t = Taxonomy::default();
        for name in [None, Some(""), Some("x")] {
            for root in [None, Some("cat00000"), Some("other")] {
                let r = record(name, &[root, Some("abcat0600000"), Some("leaf")]);
                assert!(!t.detect(&r));
            }
        }
    }

    #[test]
    fn wrong_root() {
        let r = record(Some("x"), &[Some("pcmcat00000"), Some("abcat0100000")]);
        assert!(!Taxonomy::default().detect(&r));
    }

    #[test]
    fn missing_name() {
        let ids = [Some("cat00000"), Some("abcat0100000")];
        assert!(!Taxonomy::default().detect(&record(None, &ids)));
        assert!(!Taxonomy::default().detect(&record(Some(""), &ids)));
    }

    #[test]
    fn empty_path() {
        assert!(!Taxonomy::default().detect(&record(Some("x"), &[])));
    }

    #[test]
    fn missing_leaf_id() {
        let r = record(Some("x"), &[Some("cat00000"), Some("abcat0100000"), None]);
        assert!(!Taxonomy::default().detect(&r));
    }

    #[test]
    fn single_segment() {
        let r = record(Some("x"), &[Some("cat00000")]);
        assert!(Taxonomy::default().detect(&r));
    }

    #[test]
    fn custom_roots() {
        let t = Taxonomy::new("root".to_string(), "banned".to_string());
        assert!(t.detect(&record(Some("x"), &[Some("root"), Some("ok"), Some("leaf")])));
        assert!(!t.detect(&record(Some("x"), &[Some("root"), Some("banned"), Some("leaf")])));
        assert!(!t.detect(&record(Some("x"), &[Some("cat00000"), Some("ok")])));
    }
}
