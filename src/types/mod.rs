#![forbid(unsafe_code)]

//! Identifier newtypes, the language tag, and the crate error type.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sparse, externally assigned category identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Sparse, externally assigned page identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

/// Dense internal category index in `0..N`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenseIndex(pub u32);

impl DenseIndex {
    /// Returns the index as a `usize` for slice addressing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DenseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CategoryId {
    fn from(value: u64) -> Self {
        CategoryId(value)
    }
}

impl From<CategoryId> for u64 {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

impl From<u64> for PageId {
    fn from(value: u64) -> Self {
        PageId(value)
    }
}

impl From<PageId> for u64 {
    fn from(value: PageId) -> Self {
        value.0
    }
}

impl From<u32> for DenseIndex {
    fn from(value: u32) -> Self {
        DenseIndex(value)
    }
}

impl From<DenseIndex> for u32 {
    fn from(value: DenseIndex) -> Self {
        value.0
    }
}

const LANGUAGE_MAX_LEN: usize = 24;

/// Language or locale tag a graph is scoped to (`en`, `simple`, `zh-classical`).
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    /// Parses and normalizes a language tag.
    pub fn new(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_lowercase();
        let mut chars = normalized.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_lowercase() => chars
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            _ => false,
        };
        if !valid || normalized.len() > LANGUAGE_MAX_LEN {
            return Err(CatgraphError::InvalidLanguage(code.to_string()));
        }
        Ok(Language(normalized))
    }

    /// Returns the normalized tag.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Language {
    type Err = CatgraphError;

    fn from_str(s: &str) -> Result<Self> {
        Language::new(s)
    }
}

impl TryFrom<String> for Language {
    type Error = CatgraphError;

    fn try_from(value: String) -> Result<Self> {
        Language::new(&value)
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.0
    }
}

/// Errors raised while building, loading or exporting a category graph.
#[derive(thiserror::Error, Debug)]
pub enum CatgraphError {
    /// The same sparse id was declared twice.
    #[error("duplicate category id {0}")]
    DuplicateCategory(CategoryId),
    /// An edge or membership names a category that was never declared.
    #[error("unknown category id {id} referenced by {context}")]
    UnknownCategory {
        /// The undeclared id.
        id: CategoryId,
        /// Which relation referenced it.
        context: &'static str,
    },
    /// A traversal cost is negative or not finite.
    #[error("invalid cost {cost} for category {id}")]
    InvalidCost {
        /// Category carrying the cost.
        id: CategoryId,
        /// Offending value.
        cost: f64,
    },
    /// A category lists itself as parent while self loops are rejected.
    #[error("category {0} is its own parent")]
    SelfLoop(CategoryId),
    /// Parent and child relations do not mirror each other.
    #[error("inconsistent edges: {0}")]
    InconsistentEdges(&'static str),
    /// More categories or relation entries than a `u32` index can address.
    #[error("{0} entries exceed dense index capacity")]
    CapacityExceeded(usize),
    /// Malformed language tag.
    #[error("invalid language tag '{0}'")]
    InvalidLanguage(String),
    /// Malformed row in a flat-file hierarchy source.
    #[error("{path}:{line}: {message}")]
    Parse {
        /// Source file.
        path: PathBuf,
        /// One-based line number.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },
    /// Invalid argument.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// IO failure.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encoding or decoding failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV reader failure.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, CatgraphError>;
