//! Storage collaborator.
//!
//! The pipeline only talks to [`Store`]. Each relational backend is an adapter:
//!
//! - [`SqliteStore`]: a SQLite file (or in-memory database) via `rusqlite`
//! - [`MemoryStore`]: plain vectors, evaluates the merged view in Rust
//!
//! Persisted layout, whatever the backend:
//!
//! | relation | kind | key |
//! |---|---|---|
//! | `wage_index_raw`, `cpi_raw` | append-only table | none |
//! | `wage_index_clean`, `cpi_clean` | replaced every load | `month` |
//! | `wage_cpi_merged_v` | view | derived |

use thiserror::Error;

use crate::domain::{CleanBatch, MergedRecord, RawObservation, Series};

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("duplicate month {month} in {table}")]
    DuplicateKey { table: &'static str, month: String },

    #[error("relation {0} does not exist (run the schema/view step first)")]
    MissingRelation(&'static str),

    #[error("cannot decode stored row: {0}")]
    Decode(String),

    #[error("query returned an unexpected result shape for {0}")]
    UnexpectedOutput(&'static str),
}

/// A persisted table or view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Raw(Series),
    Clean(Series),
    MergedView,
}

impl Relation {
    /// Every relation, in the order operators expect to see them reported.
    pub const ALL: [Relation; 5] = [
        Relation::Raw(Series::Wage),
        Relation::Raw(Series::Cpi),
        Relation::Clean(Series::Wage),
        Relation::Clean(Series::Cpi),
        Relation::MergedView,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Relation::Raw(series) => series.raw_table(),
            Relation::Clean(series) => series.clean_table(),
            Relation::MergedView => schema::MERGED_VIEW,
        }
    }
}

/// Aggregate of one clean series. All fields are `None` for an empty table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesSummary {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Typed read queries supported by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    RowCount(Relation),
    SeriesSummary(Series),
    /// All rows of `wage_cpi_merged_v`, ordered by month.
    Merged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    RowCount(u64),
    SeriesSummary(SeriesSummary),
    Merged(Vec<MergedRecord>),
}

pub trait Store {
    /// Short backend name for logs (`sqlite`, `memory`).
    fn backend(&self) -> &'static str;

    /// Create raw tables if absent; drop and recreate the clean tables.
    fn create_schema(&mut self) -> Result<(), StoreError>;

    /// Append raw rows for one series. Returns the number of rows written.
    fn bulk_insert_raw(&mut self, series: Series, rows: &[RawObservation]) -> Result<usize, StoreError>;

    /// Insert a clean batch into its series table. Fails on a repeated month.
    fn bulk_insert_clean(&mut self, batch: &CleanBatch) -> Result<usize, StoreError>;

    /// (Re)create `wage_cpi_merged_v`.
    fn create_views(&mut self) -> Result<(), StoreError>;

    fn query(&self, query: &Query) -> Result<QueryOutput, StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;

    fn row_count(&self, relation: Relation) -> Result<u64, StoreError> {
        match self.query(&Query::RowCount(relation))? {
            QueryOutput::RowCount(n) => Ok(n),
            _ => Err(StoreError::UnexpectedOutput(relation.name())),
        }
    }

    fn series_summary(&self, series: Series) -> Result<SeriesSummary, StoreError> {
        match self.query(&Query::SeriesSummary(series))? {
            QueryOutput::SeriesSummary(summary) => Ok(summary),
            _ => Err(StoreError::UnexpectedOutput(series.clean_table())),
        }
    }

    fn merged(&self) -> Result<Vec<MergedRecord>, StoreError> {
        match self.query(&Query::Merged)? {
            QueryOutput::Merged(rows) => Ok(rows),
            _ => Err(StoreError::UnexpectedOutput(schema::MERGED_VIEW)),
        }
    }
}

/// Which adapter to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Sqlite,
    Memory,
}
