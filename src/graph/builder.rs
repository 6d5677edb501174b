use std::time::Instant;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::types::{CatgraphError, CategoryId, DenseIndex, Language, PageId, Result};

use super::adjacency::AdjacencyStore;
use super::cost::{validate_cost, CostModel};
use super::index_map::IndexMap;
use super::options::GraphOptions;
use super::CategoryGraph;

/// Collects categories, edges and memberships, then validates them into an
/// immutable [`CategoryGraph`].
///
/// Categories may be declared after the edges that mention them; references
/// are resolved in [`CategoryGraphBuilder::build`].
pub struct CategoryGraphBuilder {
    language: Language,
    options: GraphOptions,
    index: IndexMap,
    labels: Vec<Box<str>>,
    costs: Vec<Option<f64>>,
    edges: Vec<(CategoryId, CategoryId)>,
    memberships: Vec<(CategoryId, PageId)>,
}

impl CategoryGraphBuilder {
    /// Starts an empty builder for `language`.
    pub fn new(language: Language, options: GraphOptions) -> Self {
        let capacity = options.capacity_hint;
        Self {
            language,
            index: IndexMap::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
            costs: Vec::with_capacity(capacity),
            edges: Vec::new(),
            memberships: Vec::new(),
            options,
        }
    }

    /// Declares a category. Dense indices follow declaration order.
    pub fn add_category(
        &mut self,
        id: CategoryId,
        label: impl Into<String>,
        cost: Option<f64>,
    ) -> Result<DenseIndex> {
        if let Some(cost) = cost {
            validate_cost(id, cost)?;
        }
        let index = self.index.insert(id)?;
        self.labels.push(label.into().into_boxed_str());
        self.costs.push(cost);
        Ok(index)
    }

    /// Records that `parent` directly contains `child`.
    pub fn add_edge(&mut self, parent: CategoryId, child: CategoryId) -> &mut Self {
        self.edges.push((parent, child));
        self
    }

    /// Records that `page` is a direct member of `category`.
    pub fn add_page(&mut self, category: CategoryId, page: PageId) -> &mut Self {
        self.memberships.push((category, page));
        self
    }

    /// Number of categories declared so far.
    pub fn category_count(&self) -> usize {
        self.index.len()
    }

    /// Validates everything collected and produces the graph.
    pub fn build(self) -> Result<CategoryGraph> {
        let started = Instant::now();
        self.options.cost_policy.validate()?;
        let edges = self.resolve_edges()?;
        let memberships = self.resolve_memberships()?;

        let Self {
            language,
            options,
            index,
            labels,
            costs,
            ..
        } = self;

        let adjacency = AdjacencyStore::new(labels, &edges, &memberships)?;
        let mut defaulted = 0usize;
        let costs: Vec<f64> = costs
            .into_iter()
            .enumerate()
            .map(|(i, cost)| {
                cost.unwrap_or_else(|| {
                    defaulted += 1;
                    let dense = DenseIndex(i as u32);
                    options.cost_policy.cost_for(
                        adjacency.pages(dense).len(),
                        adjacency.children(dense).len(),
                    )
                })
            })
            .collect();
        let costs = CostModel::new(costs, index.sparse_ids())?;

        info!(
            language = %language,
            categories = index.len(),
            edges = adjacency.edge_count(),
            memberships = adjacency.membership_count(),
            defaulted_costs = defaulted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catgraph.build.completed"
        );
        Ok(CategoryGraph::from_parts(
            language,
            index,
            adjacency,
            costs,
            options.metrics,
        ))
    }

    fn resolve(&self, id: CategoryId, context: &'static str) -> Result<DenseIndex> {
        self.index
            .dense_index_of(id)
            .ok_or(CatgraphError::UnknownCategory { id, context })
    }

    fn resolve_edges(&self) -> Result<Vec<(DenseIndex, DenseIndex)>> {
        let mut seen = FxHashSet::default();
        seen.reserve(self.edges.len());
        let mut resolved = Vec::with_capacity(self.edges.len());
        for &(parent, child) in &self.edges {
            let p = self.resolve(parent, "edge parent")?;
            let c = self.resolve(child, "edge child")?;
            if p == c && self.options.reject_self_loops {
                return Err(CatgraphError::SelfLoop(parent));
            }
            if seen.insert((p, c)) {
                resolved.push((p, c));
            }
        }
        let dropped = self.edges.len() - resolved.len();
        if dropped > 0 {
            debug!(dropped, "catgraph.build.duplicate_edges");
        }
        Ok(resolved)
    }

    fn resolve_memberships(&self) -> Result<Vec<(DenseIndex, PageId)>> {
        let mut seen = FxHashSet::default();
        seen.reserve(self.memberships.len());
        let mut resolved = Vec::with_capacity(self.memberships.len());
        for &(category, page) in &self.memberships {
            let c = self.resolve(category, "page membership")?;
            if seen.insert((c, page)) {
                resolved.push((c, page));
            }
        }
        let dropped = self.memberships.len() - resolved.len();
        if dropped > 0 {
            debug!(dropped, "catgraph.build.duplicate_memberships");
        }
        Ok(resolved)
    }
}
