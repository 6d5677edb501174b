use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{CatgraphError, CategoryId, DenseIndex, Language, PageId, Result};

use super::adjacency::AdjacencyStore;
use super::cost::CostModel;
use super::index_map::IndexMap;
use super::options::GraphOptions;
use super::CategoryGraph;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Encoding used for snapshot files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SnapshotFormat {
    /// Plain JSON.
    Json,
    /// JSON wrapped in snappy frames.
    JsonSnappy,
}

impl SnapshotFormat {
    /// Picks the format from a file extension: `.snap` selects snappy frames.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("snap") => SnapshotFormat::JsonSnappy,
            _ => SnapshotFormat::Json,
        }
    }
}

/// One category with its relations expressed in sparse ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    /// Sparse category id.
    pub id: CategoryId,
    /// Display label.
    pub label: String,
    /// Traversal cost.
    pub cost: f64,
    /// Parent categories in stored order.
    #[serde(default)]
    pub parents: Vec<CategoryId>,
    /// Child categories in stored order.
    #[serde(default)]
    pub children: Vec<CategoryId>,
    /// Member pages in stored order.
    #[serde(default)]
    pub pages: Vec<PageId>,
}

/// Serializable copy of a whole graph. Categories appear in dense order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Layout version, see [`SNAPSHOT_VERSION`].
    pub version: u32,
    /// Language tag.
    pub language: Language,
    /// Every category.
    pub categories: Vec<CategorySnapshot>,
}

impl CategoryGraph {
    /// Copies the graph into its serializable form.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let index = self.index_map();
        let adjacency = self.adjacency();
        let sparse = |row: &[DenseIndex]| -> Vec<CategoryId> {
            row.iter().map(|i| index.sparse_id_of(*i)).collect()
        };
        let categories = self
            .indices()
            .map(|i| CategorySnapshot {
                id: index.sparse_id_of(i),
                label: adjacency.label(i).to_string(),
                cost: self.cost_model().cost_of(i),
                parents: sparse(adjacency.parents(i)),
                children: sparse(adjacency.children(i)),
                pages: adjacency.pages(i).to_vec(),
            })
            .collect();
        GraphSnapshot {
            version: SNAPSHOT_VERSION,
            language: self.language().clone(),
            categories,
        }
    }

    /// Rebuilds a graph from a snapshot, re-running every construction check.
    ///
    /// Dense indices and relation order are reproduced exactly, so every query
    /// answers the same as on the graph the snapshot was taken from.
    pub fn from_snapshot(snapshot: GraphSnapshot, options: GraphOptions) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CatgraphError::Invalid("unsupported snapshot version"));
        }
        let count = snapshot.categories.len();
        let mut index = IndexMap::with_capacity(count);
        for category in &snapshot.categories {
            index.insert(category.id)?;
        }
        let resolve = |ids: &[CategoryId], context: &'static str| -> Result<Vec<DenseIndex>> {
            ids.iter()
                .map(|id| {
                    index
                        .dense_index_of(*id)
                        .ok_or(CatgraphError::UnknownCategory { id: *id, context })
                })
                .collect()
        };

        let mut labels = Vec::with_capacity(count);
        let mut costs = Vec::with_capacity(count);
        let mut parents = Vec::with_capacity(count);
        let mut children = Vec::with_capacity(count);
        let mut pages = Vec::with_capacity(count);
        for category in snapshot.categories {
            let row = resolve(&category.children, "snapshot children")?;
            if options.reject_self_loops && category.children.contains(&category.id) {
                return Err(CatgraphError::SelfLoop(category.id));
            }
            children.push(row);
            parents.push(resolve(&category.parents, "snapshot parents")?);
            pages.push(category.pages);
            labels.push(category.label.into_boxed_str());
            costs.push(category.cost);
        }

        let costs = CostModel::new(costs, index.sparse_ids())?;
        let adjacency = AdjacencyStore::from_rows(labels, &parents, &children, &pages)?;
        info!(
            language = %snapshot.language,
            categories = count,
            edges = adjacency.edge_count(),
            "catgraph.snapshot.loaded"
        );
        Ok(CategoryGraph::from_parts(
            snapshot.language,
            index,
            adjacency,
            costs,
            options.metrics,
        ))
    }

    /// Writes the snapshot of this graph to `writer`.
    pub fn write_snapshot<W: Write>(&self, writer: W, format: SnapshotFormat) -> Result<()> {
        let snapshot = self.to_snapshot();
        match format {
            SnapshotFormat::Json => {
                let mut out = BufWriter::new(writer);
                serde_json::to_writer(&mut out, &snapshot)?;
                out.flush()?;
            }
            SnapshotFormat::JsonSnappy => {
                let mut out = snap::write::FrameEncoder::new(BufWriter::new(writer));
                serde_json::to_writer(&mut out, &snapshot)?;
                out.flush()?;
            }
        }
        info!(
            language = %self.language(),
            categories = self.len(),
            format = ?format,
            "catgraph.snapshot.written"
        );
        Ok(())
    }

    /// Reads a snapshot from `reader` and rebuilds the graph.
    pub fn read_snapshot<R: Read>(
        reader: R,
        format: SnapshotFormat,
        options: GraphOptions,
    ) -> Result<Self> {
        let snapshot: GraphSnapshot = match format {
            SnapshotFormat::Json => serde_json::from_reader(BufReader::new(reader))?,
            SnapshotFormat::JsonSnappy => {
                serde_json::from_reader(snap::read::FrameDecoder::new(BufReader::new(reader)))?
            }
        };
        Self::from_snapshot(snapshot, options)
    }
}
