#![forbid(unsafe_code)]

//! External hierarchy sources a [`crate::graph::CategoryGraph`] is built from.
//!
//! A source hands over already-resolved identifiers for one language: the
//! categories with their labels and optional costs, the parent/child edge
//! list, and the category/page membership list.

mod csv_file;

use crate::types::{CategoryId, Language, PageId, Result};

pub use csv_file::CsvHierarchy;

/// One category as delivered by a source.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRecord {
    /// Sparse category id.
    pub id: CategoryId,
    /// Display label.
    pub label: String,
    /// Explicit traversal cost, if the source knows one.
    pub cost: Option<f64>,
}

/// Supplier of a complete category hierarchy.
pub trait HierarchySource {
    /// Language of the hierarchy.
    fn language(&self) -> &Language;

    /// Every category, in the order dense indices should be assigned.
    fn categories(&mut self) -> Result<Vec<CategoryRecord>>;

    /// `(parent, child)` edges.
    fn edges(&mut self) -> Result<Vec<(CategoryId, CategoryId)>>;

    /// `(category, page)` memberships.
    fn memberships(&mut self) -> Result<Vec<(CategoryId, PageId)>>;
}

/// Hierarchy held in memory, mostly useful for tests and small fixtures.
#[derive(Clone, Debug)]
pub struct MemoryHierarchy {
    language: Language,
    categories: Vec<CategoryRecord>,
    edges: Vec<(CategoryId, CategoryId)>,
    memberships: Vec<(CategoryId, PageId)>,
}

impl MemoryHierarchy {
    /// Creates an empty hierarchy for `language`.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            categories: Vec::new(),
            edges: Vec::new(),
            memberships: Vec::new(),
        }
    }

    /// Adds a category.
    pub fn category(mut self, id: u64, label: &str, cost: Option<f64>) -> Self {
        self.categories.push(CategoryRecord {
            id: CategoryId(id),
            label: label.to_string(),
            cost,
        });
        self
    }

    /// Adds a parent/child edge.
    pub fn edge(mut self, parent: u64, child: u64) -> Self {
        self.edges.push((CategoryId(parent), CategoryId(child)));
        self
    }

    /// Adds a page membership.
    pub fn page(mut self, category: u64, page: u64) -> Self {
        self.memberships.push((CategoryId(category), PageId(page)));
        self
    }
}

impl HierarchySource for MemoryHierarchy {
    fn language(&self) -> &Language {
        &self.language
    }

    fn categories(&mut self) -> Result<Vec<CategoryRecord>> {
        Ok(self.categories.clone())
    }

    fn edges(&mut self) -> Result<Vec<(CategoryId, CategoryId)>> {
        Ok(self.edges.clone())
    }

    fn memberships(&mut self) -> Result<Vec<(CategoryId, PageId)>> {
        Ok(self.memberships.clone())
    }
}
