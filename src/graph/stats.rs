use rustc_hash::FxHashSet;
use serde::Serialize;

use super::adjacency::Relation;
use super::CategoryGraph;

/// Summary figures for a built graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphStats {
    /// Language tag.
    pub language: String,
    /// Number of categories.
    pub categories: usize,
    /// Number of parent/child edges.
    pub edges: usize,
    /// Number of category/page memberships.
    pub page_memberships: usize,
    /// Number of distinct member pages.
    pub distinct_pages: usize,
    /// Categories without parents.
    pub roots: usize,
    /// Categories without children.
    pub leaves: usize,
    /// Largest child count of any category.
    pub max_children: usize,
    /// Largest parent count of any category.
    pub max_parents: usize,
    /// Smallest traversal cost.
    pub minimum_cost: Option<f64>,
    /// Largest traversal cost.
    pub maximum_cost: Option<f64>,
    /// Mean traversal cost.
    pub mean_cost: Option<f64>,
}

impl CategoryGraph {
    /// Computes summary statistics with one pass over each relation.
    pub fn stats(&self) -> GraphStats {
        let adjacency = self.adjacency();
        let distinct_pages: FxHashSet<_> = adjacency.all_pages().iter().collect();
        let mut roots = 0;
        let mut leaves = 0;
        for index in self.indices() {
            if adjacency.parents(index).is_empty() {
                roots += 1;
            }
            if adjacency.children(index).is_empty() {
                leaves += 1;
            }
        }
        let costs = self.cost_model();
        GraphStats {
            language: self.language().to_string(),
            categories: self.len(),
            edges: adjacency.edge_count(),
            page_memberships: adjacency.membership_count(),
            distinct_pages: distinct_pages.len(),
            roots,
            leaves,
            max_children: adjacency.max_degree(Relation::Children),
            max_parents: adjacency.max_degree(Relation::Parents),
            minimum_cost: costs.minimum_cost(),
            maximum_cost: costs.maximum_cost(),
            mean_cost: costs.mean_cost(),
        }
    }
}
