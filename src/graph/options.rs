use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{CatgraphError, Result};

use super::metrics::GraphMetrics;

/// Fallback cost for categories whose source does not supply one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum CostPolicy {
    /// Every category without an explicit cost gets this value.
    Uniform(f64),
    /// `ln(1 + pages + children)`: broad categories are more expensive to cross.
    LogMembership,
}

impl Default for CostPolicy {
    fn default() -> Self {
        CostPolicy::Uniform(1.0)
    }
}

impl CostPolicy {
    /// Cost for a category with the given direct fan-out.
    pub fn cost_for(self, pages: usize, children: usize) -> f64 {
        match self {
            CostPolicy::Uniform(cost) => cost,
            CostPolicy::LogMembership => ((1 + pages + children) as f64).ln(),
        }
    }

    /// Rejects a uniform cost that is negative, infinite or NaN.
    pub fn validate(self) -> Result<()> {
        match self {
            CostPolicy::Uniform(cost) if !cost.is_finite() || cost < 0.0 => Err(
                CatgraphError::Invalid("uniform cost must be finite and non-negative"),
            ),
            _ => Ok(()),
        }
    }
}

/// Configuration options supplied when building a [`super::CategoryGraph`].
#[derive(Clone, Default)]
pub struct GraphOptions {
    /// Cost assigned to categories that arrive without one.
    pub cost_policy: CostPolicy,
    /// Whether a category listed as its own parent is a construction fault.
    pub reject_self_loops: bool,
    /// Expected number of categories, used to pre-size internal tables.
    pub capacity_hint: usize,
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn GraphMetrics>>,
}

impl GraphOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback cost policy.
    pub fn cost_policy(mut self, policy: CostPolicy) -> Self {
        self.cost_policy = policy;
        self
    }

    /// Enables or disables rejecting self loops.
    pub fn reject_self_loops(mut self, enabled: bool) -> Self {
        self.reject_self_loops = enabled;
        self
    }

    /// Sets the expected category count.
    pub fn capacity_hint(mut self, categories: usize) -> Self {
        self.capacity_hint = categories;
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn GraphMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
