//! Catalog items, as read from a catalog file.

/// One entry of an item's category path.
///
/// Both fields may be missing in the source data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPathSegment {
    id: Option<String>,
    name: Option<String>,
}

impl CategoryPathSegment {
    pub fn new(id: Option<String>, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Get the segment's category identifier.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get the segment's category name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}

/// A raw catalog item.
///
/// The category path is positional: segment 0 is the department root,
/// segment 1 the sub-branch and the last one the leaf category.
/// An absent path is represented by an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    name: Option<String>,
    category_path: Vec<CategoryPathSegment>,
}

impl RawRecord {
    pub fn new(name: Option<String>, category_path: Vec<CategoryPathSegment>) -> Self {
        Self {
            name,
            category_path,
        }
    }

    /// Get the item's name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn category_path(&self) -> &[CategoryPathSegment] {
        &self.category_path
    }

    /// Department root, if any.
    pub fn root(&self) -> Option<&CategoryPathSegment> {
        self.category_path.first()
    }

    /// Sub-branch, if the path is at least two segments long.
    pub fn branch(&self) -> Option<&CategoryPathSegment> {
        self.category_path.get(1)
    }

    /// Most specific category.
    pub fn leaf(&self) -> Option<&CategoryPathSegment> {
        self.category_path.last()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub(crate) fn category_path_mut(&mut self) -> &mut Vec<CategoryPathSegment> {
        &mut self.category_path
    }
}
