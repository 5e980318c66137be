//! In-memory storage adapter for development and tests.
//!
//! Mirrors the SQLite semantics: the month primary key is enforced, raw
//! tables survive `create_schema`, and a transaction is a snapshot that
//! `rollback` restores.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::{CleanBatch, CleanObservation, Month, RawObservation, Series};
use crate::merge::merge_series;
use crate::store::schema::MERGED_VIEW;
use crate::store::{Query, QueryOutput, Relation, SeriesSummary, Store, StoreError};

#[derive(Debug, Clone, Default)]
struct Tables {
    raw: HashMap<Series, Vec<RawObservation>>,
    clean: HashMap<Series, BTreeMap<Month, f64>>,
    merged_view: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn clean_table(&self, series: Series) -> Result<&BTreeMap<Month, f64>, StoreError> {
        self.tables
            .clean
            .get(&series)
            .ok_or(StoreError::MissingRelation(series.clean_table()))
    }

    fn clean_observations(&self, series: Series) -> Result<Vec<CleanObservation>, StoreError> {
        Ok(self
            .clean_table(series)?
            .iter()
            .map(|(month, value)| CleanObservation {
                month: *month,
                value: *value,
            })
            .collect())
    }

    fn merged_rows(&self) -> Result<Vec<crate::domain::MergedRecord>, StoreError> {
        if !self.tables.merged_view {
            return Err(StoreError::MissingRelation(MERGED_VIEW));
        }
        let wage = self.clean_observations(Series::Wage)?;
        let cpi = self.clean_observations(Series::Cpi)?;
        Ok(merge_series(&wage, &cpi))
    }

    fn count(&self, relation: Relation) -> Result<u64, StoreError> {
        let n = match relation {
            Relation::Raw(series) => self
                .tables
                .raw
                .get(&series)
                .map(Vec::len)
                .ok_or(StoreError::MissingRelation(relation.name()))?,
            Relation::Clean(series) => self.clean_table(series)?.len(),
            Relation::MergedView => self.merged_rows()?.len(),
        };
        Ok(n as u64)
    }

    fn summary(&self, series: Series) -> Result<SeriesSummary, StoreError> {
        let table = self.clean_table(series)?;
        if table.is_empty() {
            return Ok(SeriesSummary::default());
        }
        let values = table.values().copied();
        let sum: f64 = values.clone().sum();
        Ok(SeriesSummary {
            avg: Some(sum / table.len() as f64),
            min: values.clone().reduce(f64::min),
            max: values.reduce(f64::max),
        })
    }
}

impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn create_schema(&mut self) -> Result<(), StoreError> {
        for series in Series::ALL {
            self.tables.raw.entry(series).or_default();
            self.tables.clean.insert(series, BTreeMap::new());
        }
        self.tables.merged_view = false;
        Ok(())
    }

    fn bulk_insert_raw(&mut self, series: Series, rows: &[RawObservation]) -> Result<usize, StoreError> {
        let table = self
            .tables
            .raw
            .get_mut(&series)
            .ok_or(StoreError::MissingRelation(series.raw_table()))?;
        table.extend_from_slice(rows);
        debug!(table = series.raw_table(), rows = rows.len(), "inserted raw rows");
        Ok(rows.len())
    }

    fn bulk_insert_clean(&mut self, batch: &CleanBatch) -> Result<usize, StoreError> {
        let name = batch.series.clean_table();
        let table = self
            .tables
            .clean
            .get_mut(&batch.series)
            .ok_or(StoreError::MissingRelation(name))?;
        for obs in &batch.observations {
            if table.insert(obs.month, obs.value).is_some() {
                return Err(StoreError::DuplicateKey {
                    table: name,
                    month: obs.month.to_string(),
                });
            }
        }
        debug!(table = name, rows = batch.len(), "inserted clean rows");
        Ok(batch.len())
    }

    fn create_views(&mut self) -> Result<(), StoreError> {
        for series in Series::ALL {
            self.clean_table(series)?;
        }
        self.tables.merged_view = true;
        Ok(())
    }

    fn query(&self, query: &Query) -> Result<QueryOutput, StoreError> {
        Ok(match query {
            Query::RowCount(relation) => QueryOutput::RowCount(self.count(*relation)?),
            Query::SeriesSummary(series) => QueryOutput::SeriesSummary(self.summary(*series)?),
            Query::Merged => QueryOutput::Merged(self.merged_rows()?),
        })
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(previous) = self.snapshot.take() {
            self.tables = previous;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_requires_create_views() {
        let mut store = MemoryStore::new();
        store.create_schema().unwrap();
        assert!(matches!(store.merged(), Err(StoreError::MissingRelation("wage_cpi_merged_v"))));
        store.create_views().unwrap();
        assert!(store.merged().unwrap().is_empty());
    }

    #[test]
    fn recreating_schema_drops_the_view() {
        let mut store = MemoryStore::new();
        store.create_schema().unwrap();
        store.create_views().unwrap();
        store.create_schema().unwrap();
        assert!(store.merged().is_err());
    }

    #[test]
    fn inserts_need_a_schema() {
        let mut store = MemoryStore::new();
        let err = store.bulk_insert_raw(Series::Wage, &[]).unwrap_err();
        assert!(matches!(err, StoreError::MissingRelation("wage_index_raw")));
    }
}
