//! Compact, read-only category graphs.
//!
//! `catgraph` keeps a hierarchical category system (Wikipedia's category tree
//! being the motivating case) in memory with dense internal indices, three
//! parallel relations (parents, children, member pages), labels, and a
//! per-category traversal cost model used by external relatedness and
//! shortest-path algorithms.

#![warn(missing_docs)]

pub mod graph;
pub mod source;
pub mod types;

pub use graph::{
    CategoryGraph, CategoryGraphBuilder, CostPolicy, GraphOptions, GraphStats, Relation,
    SnapshotFormat,
};
pub use source::{CategoryRecord, CsvHierarchy, HierarchySource, MemoryHierarchy};
pub use types::{CatgraphError, CategoryId, DenseIndex, Language, PageId, Result};
