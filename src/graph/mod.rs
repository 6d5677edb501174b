//! Compact, immutable category hierarchy.
//!
//! A [`CategoryGraph`] is built once, from a [`crate::source::HierarchySource`]
//! or a [`CategoryGraphBuilder`], and is read-only afterwards. Every query is
//! total: identifiers outside the graph produce empty results or `None`
//! instead of errors. Passing an out-of-range [`DenseIndex`] directly is a
//! caller bug and panics.
//!
//! Internally categories live in a dense index space `0..N`; the
//! [`IndexMap`] translates sparse external ids at the boundary, the
//! [`AdjacencyStore`] keeps parents, children and member pages as compressed
//! rows, and the [`CostModel`] carries per-category traversal costs.

mod adjacency;
mod builder;
mod cost;
mod index_map;
mod metrics;
mod options;
mod snapshot;
mod stats;

use std::fmt;
use std::sync::Arc;

use crate::source::HierarchySource;
use crate::types::{CategoryId, DenseIndex, Language, PageId, Result};

pub use adjacency::{AdjacencyStore, Relation};
pub use builder::CategoryGraphBuilder;
pub use cost::CostModel;
pub use index_map::IndexMap;
pub use metrics::{default_metrics, CounterMetrics, CounterSnapshot, GraphMetrics, NoopMetrics};
pub use options::{CostPolicy, GraphOptions};
pub use snapshot::{CategorySnapshot, GraphSnapshot, SnapshotFormat, SNAPSHOT_VERSION};
pub use stats::GraphStats;

/// Category hierarchy for one language, with its cost model.
///
/// The graph is `Send + Sync` and never mutates after construction, so it can
/// be shared behind an [`Arc`] by any number of readers without locking.
/// Publishing a changed hierarchy means building a new instance.
pub struct CategoryGraph {
    language: Language,
    index: IndexMap,
    adjacency: AdjacencyStore,
    costs: CostModel,
    metrics: Arc<dyn GraphMetrics>,
}

impl fmt::Debug for CategoryGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryGraph")
            .field("language", &self.language)
            .field("categories", &self.len())
            .field("edges", &self.adjacency.edge_count())
            .field("memberships", &self.adjacency.membership_count())
            .finish_non_exhaustive()
    }
}

impl CategoryGraph {
    pub(crate) fn from_parts(
        language: Language,
        index: IndexMap,
        adjacency: AdjacencyStore,
        costs: CostModel,
        metrics: Option<Arc<dyn GraphMetrics>>,
    ) -> Self {
        debug_assert_eq!(index.len(), adjacency.len());
        debug_assert_eq!(index.len(), costs.costs().len());
        Self {
            language,
            index,
            adjacency,
            costs,
            metrics: metrics.unwrap_or_else(default_metrics),
        }
    }

    /// Starts a builder for `language`.
    pub fn builder(language: Language, options: GraphOptions) -> CategoryGraphBuilder {
        CategoryGraphBuilder::new(language, options)
    }

    /// Builds a graph from an external hierarchy source.
    pub fn load<S>(source: &mut S, options: GraphOptions) -> Result<Self>
    where
        S: HierarchySource + ?Sized,
    {
        let categories = source.categories()?;
        let options = if options.capacity_hint == 0 {
            options.capacity_hint(categories.len())
        } else {
            options
        };
        let mut builder = CategoryGraphBuilder::new(source.language().clone(), options);
        for record in categories {
            builder.add_category(record.id, record.label, record.cost)?;
        }
        for (parent, child) in source.edges()? {
            builder.add_edge(parent, child);
        }
        for (category, page) in source.memberships()? {
            builder.add_page(category, page);
        }
        builder.build()
    }

    /// Language the hierarchy belongs to.
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the graph has no categories.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Crosses from sparse id space into dense index space.
    ///
    /// `None` means the id is not a category of this graph; that is an
    /// ordinary outcome, not an error.
    pub fn category_index(&self, id: CategoryId) -> Option<DenseIndex> {
        let index = self.index.dense_index_of(id);
        self.metrics.lookup(index.is_some());
        index
    }

    /// Whether `id` is a category of this graph.
    pub fn contains(&self, id: CategoryId) -> bool {
        self.category_index(id).is_some()
    }

    /// Sparse id of the category at `index`.
    ///
    /// # Panics
    /// Panics when `index` is outside `0..len()`.
    #[track_caller]
    pub fn category_id(&self, index: DenseIndex) -> CategoryId {
        self.index.sparse_id_of(index)
    }

    /// Checked variant of [`CategoryGraph::category_id`].
    pub fn try_category_id(&self, index: DenseIndex) -> Option<CategoryId> {
        self.index.try_sparse_id_of(index)
    }

    /// Direct children of `id`, in construction order.
    ///
    /// An unknown id yields an empty list. An empty result therefore does not
    /// prove `id` is a leaf category; check [`CategoryGraph::contains`] too.
    pub fn children(&self, id: CategoryId) -> Vec<CategoryId> {
        self.metrics.traversal(Relation::Children);
        self.adjacency.children_of(&self.index, id)
    }

    /// Direct parents of `id`; empty for unknown ids.
    pub fn parents(&self, id: CategoryId) -> Vec<CategoryId> {
        self.metrics.traversal(Relation::Parents);
        self.adjacency.parents_of(&self.index, id)
    }

    /// Pages that are direct members of `id`; empty for unknown ids.
    pub fn pages(&self, id: CategoryId) -> Vec<PageId> {
        self.metrics.traversal(Relation::Pages);
        self.adjacency.pages_of(&self.index, id)
    }

    /// Child indices of `index`, without copying.
    #[track_caller]
    pub fn children_of_index(&self, index: DenseIndex) -> &[DenseIndex] {
        self.metrics.traversal(Relation::Children);
        self.adjacency.children(index)
    }

    /// Parent indices of `index`, without copying.
    #[track_caller]
    pub fn parents_of_index(&self, index: DenseIndex) -> &[DenseIndex] {
        self.metrics.traversal(Relation::Parents);
        self.adjacency.parents(index)
    }

    /// Member pages of `index`, without copying.
    #[track_caller]
    pub fn pages_of_index(&self, index: DenseIndex) -> &[PageId] {
        self.metrics.traversal(Relation::Pages);
        self.adjacency.pages(index)
    }

    /// Label of `id`, if it is a category of this graph.
    pub fn label(&self, id: CategoryId) -> Option<&str> {
        self.category_index(id)
            .map(|index| self.adjacency.label(index))
    }

    /// Label of the category at `index`.
    #[track_caller]
    pub fn label_of(&self, index: DenseIndex) -> &str {
        self.adjacency.label(index)
    }

    /// Traversal cost of `id`, if it is a category of this graph.
    pub fn cost(&self, id: CategoryId) -> Option<f64> {
        self.category_index(id)
            .map(|index| self.costs.cost_of(index))
    }

    /// Traversal cost of the category at `index`.
    #[track_caller]
    pub fn cost_of(&self, index: DenseIndex) -> f64 {
        self.costs.cost_of(index)
    }

    /// Smallest category cost, computed on first use and cached. `None` for an
    /// empty graph.
    pub fn minimum_cost(&self) -> Option<f64> {
        self.costs.minimum_cost()
    }

    /// Categories without parents, in dense order.
    pub fn roots(&self) -> Vec<CategoryId> {
        self.indices()
            .filter(|index| self.adjacency.parents(*index).is_empty())
            .map(|index| self.index.sparse_id_of(index))
            .collect()
    }

    /// Sparse ids of every category, in dense order.
    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.index.sparse_ids().iter().copied()
    }

    /// Every dense index, `0..len()`.
    pub fn indices(&self) -> impl Iterator<Item = DenseIndex> {
        (0..self.len() as u32).map(DenseIndex)
    }

    /// Id translation table.
    pub fn index_map(&self) -> &IndexMap {
        &self.index
    }

    /// Relation storage.
    pub fn adjacency(&self) -> &AdjacencyStore {
        &self.adjacency
    }

    /// Cost model.
    pub fn cost_model(&self) -> &CostModel {
        &self.costs
    }
}
