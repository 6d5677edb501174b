use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::adjacency::Relation;

/// Trait for tracking query activity against a category graph.
///
/// Implementations are shared by all readers of a published graph, so they
/// must tolerate concurrent calls.
pub trait GraphMetrics: Send + Sync {
    /// Records a sparse id lookup and whether the id belonged to the graph.
    fn lookup(&self, hit: bool);

    /// Records a traversal of one relation.
    fn traversal(&self, relation: Relation);
}

/// A no-op implementation of [`GraphMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl GraphMetrics for NoopMetrics {
    fn lookup(&self, _hit: bool) {}
    fn traversal(&self, _relation: Relation) {}
}

/// A thread-safe counter-based implementation of [`GraphMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Lookups whose id was part of the graph.
    pub lookup_hits: AtomicU64,

    /// Lookups whose id was unknown.
    pub lookup_misses: AtomicU64,

    /// Parent traversals.
    pub parent_traversals: AtomicU64,

    /// Child traversals.
    pub child_traversals: AtomicU64,

    /// Page membership traversals.
    pub page_traversals: AtomicU64,
}

/// Point-in-time copy of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CounterSnapshot {
    /// Lookups whose id was part of the graph.
    pub lookup_hits: u64,
    /// Lookups whose id was unknown.
    pub lookup_misses: u64,
    /// Parent traversals.
    pub parent_traversals: u64,
    /// Child traversals.
    pub child_traversals: u64,
    /// Page membership traversals.
    pub page_traversals: u64,
}

impl CounterSnapshot {
    /// Share of lookups that resolved to a category.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookup_hits + self.lookup_misses;
        if total == 0 {
            return 0.0;
        }
        self.lookup_hits as f64 / total as f64
    }
}

impl CounterMetrics {
    /// Loads every counter.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            parent_traversals: self.parent_traversals.load(Ordering::Relaxed),
            child_traversals: self.child_traversals.load(Ordering::Relaxed),
            page_traversals: self.page_traversals.load(Ordering::Relaxed),
        }
    }
}

impl GraphMetrics for CounterMetrics {
    fn lookup(&self, hit: bool) {
        if hit {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn traversal(&self, relation: Relation) {
        let counter = match relation {
            Relation::Parents => &self.parent_traversals,
            Relation::Children => &self.child_traversals,
            Relation::Pages => &self.page_traversals,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
pub fn default_metrics() -> Arc<dyn GraphMetrics> {
    Arc::new(NoopMetrics)
}
