use rustc_hash::FxHashMap;

use crate::types::{CatgraphError, CategoryId, DenseIndex, Result};

/// Bidirectional map between sparse category ids and dense indices.
///
/// Dense indices are handed out in insertion order, so they always form the
/// contiguous range `0..len()`.
#[derive(Clone, Debug, Default)]
pub struct IndexMap {
    dense: FxHashMap<CategoryId, DenseIndex>,
    sparse: Vec<CategoryId>,
}

impl IndexMap {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut dense = FxHashMap::default();
        dense.reserve(capacity);
        Self {
            dense,
            sparse: Vec::with_capacity(capacity),
        }
    }

    /// Assigns the next dense index to `id`.
    pub(crate) fn insert(&mut self, id: CategoryId) -> Result<DenseIndex> {
        if self.dense.contains_key(&id) {
            return Err(CatgraphError::DuplicateCategory(id));
        }
        let next = u32::try_from(self.sparse.len())
            .map_err(|_| CatgraphError::CapacityExceeded(self.sparse.len() + 1))?;
        let index = DenseIndex(next);
        self.dense.insert(id, index);
        self.sparse.push(id);
        Ok(index)
    }

    /// Dense index for `id`, or `None` when the id is not part of the graph.
    #[inline]
    pub fn dense_index_of(&self, id: CategoryId) -> Option<DenseIndex> {
        self.dense.get(&id).copied()
    }

    /// Sparse id stored at `index`.
    ///
    /// # Panics
    /// Panics when `index` is outside `0..len()`.
    #[inline]
    #[track_caller]
    pub fn sparse_id_of(&self, index: DenseIndex) -> CategoryId {
        match self.sparse.get(index.as_usize()) {
            Some(id) => *id,
            None => panic!(
                "dense index {} out of range for {} categories",
                index.0,
                self.sparse.len()
            ),
        }
    }

    /// Checked variant of [`IndexMap::sparse_id_of`].
    #[inline]
    pub fn try_sparse_id_of(&self, index: DenseIndex) -> Option<CategoryId> {
        self.sparse.get(index.as_usize()).copied()
    }

    /// Number of mapped categories.
    pub fn len(&self) -> usize {
        self.sparse.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.sparse.is_empty()
    }

    /// Sparse ids in dense order.
    pub fn sparse_ids(&self) -> &[CategoryId] {
        &self.sparse
    }
}
