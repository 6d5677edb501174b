use rustc_hash::FxHashSet;

use crate::types::{CatgraphError, CategoryId, DenseIndex, PageId, Result};

use super::index_map::IndexMap;

/// The relations stored per category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Relation {
    /// Parent categories.
    Parents,
    /// Child categories.
    Children,
    /// Member pages.
    Pages,
}

impl Relation {
    /// Stable lowercase name, used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Parents => "parents",
            Relation::Children => "children",
            Relation::Pages => "pages",
        }
    }
}

/// Compressed sparse rows: `targets[offsets[i]..offsets[i + 1]]` is row `i`.
#[derive(Clone, Debug)]
pub(crate) struct Csr<T> {
    offsets: Vec<u32>,
    targets: Vec<T>,
}

impl<T: Copy> Csr<T> {
    /// Builds `rows` rows from `(row, target)` pairs. Pairs keep their input
    /// order within a row.
    pub(crate) fn from_pairs(rows: usize, pairs: &[(DenseIndex, T)]) -> Result<Self> {
        if u32::try_from(pairs.len()).is_err() {
            return Err(CatgraphError::CapacityExceeded(pairs.len()));
        }
        let mut sorted: Vec<(DenseIndex, T)> = pairs.to_vec();
        // stable: equal rows keep construction order
        sorted.sort_by_key(|(row, _)| *row);

        let mut offsets = Vec::with_capacity(rows + 1);
        let mut targets = Vec::with_capacity(sorted.len());
        offsets.push(0);
        let mut current = 0usize;
        for (row, target) in sorted {
            debug_assert!(row.as_usize() < rows, "row {} out of range", row.0);
            while current < row.as_usize() {
                offsets.push(targets.len() as u32);
                current += 1;
            }
            targets.push(target);
        }
        while current < rows {
            offsets.push(targets.len() as u32);
            current += 1;
        }
        Ok(Self { offsets, targets })
    }

    /// Builds one row per input list, keeping each list's order.
    pub(crate) fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let total: usize = rows.iter().map(Vec::len).sum();
        if u32::try_from(total).is_err() {
            return Err(CatgraphError::CapacityExceeded(total));
        }
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut targets = Vec::with_capacity(total);
        offsets.push(0);
        for row in rows {
            targets.extend_from_slice(row);
            offsets.push(targets.len() as u32);
        }
        Ok(Self { offsets, targets })
    }

    #[inline]
    #[track_caller]
    pub(crate) fn row(&self, index: DenseIndex) -> &[T] {
        let i = index.as_usize();
        assert!(
            i + 1 < self.offsets.len(),
            "dense index {} out of range for {} categories",
            index.0,
            self.rows()
        );
        &self.targets[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    pub(crate) fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn nnz(&self) -> usize {
        self.targets.len()
    }

    pub(crate) fn max_degree(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn values(&self) -> &[T] {
        &self.targets
    }
}

/// Parent, child and page relations plus labels, all in dense index space.
#[derive(Clone, Debug)]
pub struct AdjacencyStore {
    parents: Csr<DenseIndex>,
    children: Csr<DenseIndex>,
    pages: Csr<PageId>,
    labels: Vec<Box<str>>,
}

impl AdjacencyStore {
    /// `edges` are `(parent, child)` pairs; both relations derive from the same
    /// list so they stay mirror images of each other.
    pub(crate) fn new(
        labels: Vec<Box<str>>,
        edges: &[(DenseIndex, DenseIndex)],
        memberships: &[(DenseIndex, PageId)],
    ) -> Result<Self> {
        let rows = labels.len();
        let children = Csr::from_pairs(rows, edges)?;
        let reversed: Vec<(DenseIndex, DenseIndex)> =
            edges.iter().map(|(parent, child)| (*child, *parent)).collect();
        let parents = Csr::from_pairs(rows, &reversed)?;
        let pages = Csr::from_pairs(rows, memberships)?;
        Ok(Self {
            parents,
            children,
            pages,
            labels,
        })
    }

    /// Rebuilds a store from explicit per-category rows, as found in a
    /// snapshot. Parent and child rows must mirror each other exactly.
    pub(crate) fn from_rows(
        labels: Vec<Box<str>>,
        parents: &[Vec<DenseIndex>],
        children: &[Vec<DenseIndex>],
        pages: &[Vec<PageId>],
    ) -> Result<Self> {
        debug_assert_eq!(labels.len(), parents.len());
        debug_assert_eq!(labels.len(), children.len());
        debug_assert_eq!(labels.len(), pages.len());
        let mut forward = FxHashSet::default();
        for (parent, row) in children.iter().enumerate() {
            for child in row {
                if !forward.insert((DenseIndex(parent as u32), *child)) {
                    return Err(CatgraphError::InconsistentEdges("duplicate child entry"));
                }
            }
        }
        let mut backward = FxHashSet::default();
        for (child, row) in parents.iter().enumerate() {
            for parent in row {
                let edge = (*parent, DenseIndex(child as u32));
                if !forward.contains(&edge) {
                    return Err(CatgraphError::InconsistentEdges(
                        "parent entry without matching child entry",
                    ));
                }
                if !backward.insert(edge) {
                    return Err(CatgraphError::InconsistentEdges("duplicate parent entry"));
                }
            }
        }
        if backward.len() != forward.len() {
            return Err(CatgraphError::InconsistentEdges(
                "child entry without matching parent entry",
            ));
        }
        let mut memberships = FxHashSet::default();
        for (category, row) in pages.iter().enumerate() {
            for page in row {
                if !memberships.insert((category, *page)) {
                    return Err(CatgraphError::InconsistentEdges("duplicate page entry"));
                }
            }
        }
        Ok(Self {
            parents: Csr::from_rows(parents)?,
            children: Csr::from_rows(children)?,
            pages: Csr::from_rows(pages)?,
            labels,
        })
    }

    /// Sparse ids of the children of `id`; empty when `id` is unknown.
    pub fn children_of(&self, map: &IndexMap, id: CategoryId) -> Vec<CategoryId> {
        match map.dense_index_of(id) {
            Some(index) => self.to_sparse(map, self.children.row(index)),
            None => Vec::new(),
        }
    }

    /// Sparse ids of the parents of `id`; empty when `id` is unknown.
    pub fn parents_of(&self, map: &IndexMap, id: CategoryId) -> Vec<CategoryId> {
        match map.dense_index_of(id) {
            Some(index) => self.to_sparse(map, self.parents.row(index)),
            None => Vec::new(),
        }
    }

    /// Member pages of `id`; empty when `id` is unknown or has no direct members.
    pub fn pages_of(&self, map: &IndexMap, id: CategoryId) -> Vec<PageId> {
        match map.dense_index_of(id) {
            Some(index) => self.pages.row(index).to_vec(),
            None => Vec::new(),
        }
    }

    fn to_sparse(&self, map: &IndexMap, row: &[DenseIndex]) -> Vec<CategoryId> {
        row.iter().map(|index| map.sparse_id_of(*index)).collect()
    }

    /// Read-only view of the child indices of `index`.
    #[inline]
    #[track_caller]
    pub fn children(&self, index: DenseIndex) -> &[DenseIndex] {
        self.children.row(index)
    }

    /// Read-only view of the parent indices of `index`.
    #[inline]
    #[track_caller]
    pub fn parents(&self, index: DenseIndex) -> &[DenseIndex] {
        self.parents.row(index)
    }

    /// Read-only view of the member pages of `index`.
    #[inline]
    #[track_caller]
    pub fn pages(&self, index: DenseIndex) -> &[PageId] {
        self.pages.row(index)
    }

    /// Label of `index`.
    #[inline]
    #[track_caller]
    pub fn label(&self, index: DenseIndex) -> &str {
        &self.labels[index.as_usize()]
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the store holds no categories.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of parent/child edges.
    pub fn edge_count(&self) -> usize {
        self.children.nnz()
    }

    /// Number of category/page memberships.
    pub fn membership_count(&self) -> usize {
        self.pages.nnz()
    }

    /// Largest row length of `relation`.
    pub(crate) fn max_degree(&self, relation: Relation) -> usize {
        match relation {
            Relation::Parents => self.parents.max_degree(),
            Relation::Children => self.children.max_degree(),
            Relation::Pages => self.pages.max_degree(),
        }
    }

    /// Every membership entry, grouped by category.
    pub(crate) fn all_pages(&self) -> &[PageId] {
        self.pages.values()
    }
}
