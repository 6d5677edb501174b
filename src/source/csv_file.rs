use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::types::{CatgraphError, CategoryId, Language, PageId, Result};

use super::{CategoryRecord, HierarchySource};

const ID_COLUMN: &str = "id";
const LABEL_COLUMN: &str = "label";
const COST_COLUMN: &str = "cost";
const PARENT_COLUMN: &str = "parent";
const CHILD_COLUMN: &str = "child";
const CATEGORY_COLUMN: &str = "category";
const PAGE_COLUMN: &str = "page";

/// Hierarchy stored as headed CSV files.
///
/// * categories: `id,label[,cost]` (an empty cost cell means "no cost")
/// * edges: `parent,child`
/// * pages: `category,page`
///
/// The edge and page files are optional; a missing file means no entries.
#[derive(Clone, Debug)]
pub struct CsvHierarchy {
    language: Language,
    categories: PathBuf,
    edges: Option<PathBuf>,
    pages: Option<PathBuf>,
}

impl CsvHierarchy {
    /// Creates a source reading categories from `categories`.
    pub fn new(language: Language, categories: impl Into<PathBuf>) -> Self {
        Self {
            language,
            categories: categories.into(),
            edges: None,
            pages: None,
        }
    }

    /// Sets the edge file.
    pub fn with_edges(mut self, path: impl Into<PathBuf>) -> Self {
        self.edges = Some(path.into());
        self
    }

    /// Sets the page membership file.
    pub fn with_pages(mut self, path: impl Into<PathBuf>) -> Self {
        self.pages = Some(path.into());
        self
    }
}

impl HierarchySource for CsvHierarchy {
    fn language(&self) -> &Language {
        &self.language
    }

    fn categories(&mut self) -> Result<Vec<CategoryRecord>> {
        let path = self.categories.as_path();
        let mut reader = open(path)?;
        let headers = reader.headers()?.clone();
        let id_col = column(&headers, path, ID_COLUMN)?;
        let label_col = column(&headers, path, LABEL_COLUMN)?;
        let cost_col = headers.iter().position(|h| h == COST_COLUMN);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cost = match cost_col {
                Some(col) if !row.get(col).unwrap_or_default().is_empty() => {
                    Some(parse_cell::<f64>(&row, col, path, COST_COLUMN)?)
                }
                _ => None,
            };
            records.push(CategoryRecord {
                id: CategoryId(parse_cell(&row, id_col, path, ID_COLUMN)?),
                label: row.get(label_col).unwrap_or_default().to_string(),
                cost,
            });
        }
        debug!(path = %path.display(), rows = records.len(), "catgraph.source.csv.loaded");
        Ok(records)
    }

    fn edges(&mut self) -> Result<Vec<(CategoryId, CategoryId)>> {
        let Some(path) = self.edges.as_deref() else {
            return Ok(Vec::new());
        };
        read_pairs(path, PARENT_COLUMN, CHILD_COLUMN, |parent, child| {
            (CategoryId(parent), CategoryId(child))
        })
    }

    fn memberships(&mut self) -> Result<Vec<(CategoryId, PageId)>> {
        let Some(path) = self.pages.as_deref() else {
            return Ok(Vec::new());
        };
        read_pairs(path, CATEGORY_COLUMN, PAGE_COLUMN, |category, page| {
            (CategoryId(category), PageId(page))
        })
    }
}

fn open(path: &Path) -> Result<Reader<File>> {
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?)
}

fn read_pairs<T>(
    path: &Path,
    left: &'static str,
    right: &'static str,
    make: impl Fn(u64, u64) -> T,
) -> Result<Vec<T>> {
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();
    let left_col = column(&headers, path, left)?;
    let right_col = column(&headers, path, right)?;
    let mut pairs = Vec::new();
    for row in reader.records() {
        let row = row?;
        pairs.push(make(
            parse_cell(&row, left_col, path, left)?,
            parse_cell(&row, right_col, path, right)?,
        ));
    }
    debug!(path = %path.display(), rows = pairs.len(), "catgraph.source.csv.loaded");
    Ok(pairs)
}

fn column(headers: &StringRecord, path: &Path, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| CatgraphError::Parse {
            path: path.to_path_buf(),
            line: 1,
            message: format!("missing column '{name}'"),
        })
}

fn parse_cell<T: FromStr>(row: &StringRecord, col: usize, path: &Path, name: &str) -> Result<T> {
    let line = row.position().map(|p| p.line()).unwrap_or(0);
    let cell = row.get(col).unwrap_or_default();
    cell.parse().map_err(|_| CatgraphError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid {name} value '{cell}'"),
    })
}
