use std::sync::OnceLock;

use tracing::debug;

use crate::types::{CatgraphError, CategoryId, DenseIndex, Result};

/// Per-category traversal costs plus the lazily computed graph-wide minimum.
#[derive(Debug, Default)]
pub struct CostModel {
    costs: Vec<f64>,
    min_cost: OnceLock<Option<f64>>,
}

impl CostModel {
    /// Costs are checked against their owning ids; every value must be
    /// finite and non-negative.
    pub(crate) fn new(costs: Vec<f64>, ids: &[CategoryId]) -> Result<Self> {
        debug_assert_eq!(costs.len(), ids.len());
        for (cost, id) in costs.iter().zip(ids) {
            validate_cost(*id, *cost)?;
        }
        Ok(Self {
            costs,
            min_cost: OnceLock::new(),
        })
    }

    /// Cost of passing through `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of range.
    #[inline]
    #[track_caller]
    pub fn cost_of(&self, index: DenseIndex) -> f64 {
        self.costs[index.as_usize()]
    }

    /// Smallest cost in the graph, `None` for an empty graph.
    ///
    /// The first call scans every category; later calls return the cached value.
    pub fn minimum_cost(&self) -> Option<f64> {
        *self.min_cost.get_or_init(|| {
            let min = self.costs.iter().copied().reduce(f64::min);
            debug!(categories = self.costs.len(), min_cost = ?min, "catgraph.cost.min_computed");
            min
        })
    }

    /// Whether [`CostModel::minimum_cost`] has already been computed.
    pub fn minimum_is_cached(&self) -> bool {
        self.min_cost.get().is_some()
    }

    /// Largest cost in the graph.
    pub fn maximum_cost(&self) -> Option<f64> {
        self.costs.iter().copied().reduce(f64::max)
    }

    /// Arithmetic mean of all costs.
    pub fn mean_cost(&self) -> Option<f64> {
        if self.costs.is_empty() {
            return None;
        }
        Some(self.costs.iter().sum::<f64>() / self.costs.len() as f64)
    }

    /// Costs in dense order.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }
}

pub(crate) fn validate_cost(id: CategoryId, cost: f64) -> Result<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(CatgraphError::InvalidCost { id, cost });
    }
    Ok(())
}
