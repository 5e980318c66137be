use std::path::Path;

use rusqlite::{Connection, ErrorCode, params};
use tracing::{debug, info};

use crate::domain::{CleanBatch, MergedRecord, Month, RawObservation, Season, Series};
use crate::store::schema::{MERGED_SELECT, SCHEMA_SQL, VIEWS_SQL};
use crate::store::{Query, QueryOutput, SeriesSummary, Store, StoreError};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening SQLite store");
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    fn count(&self, relation: &str) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {relation}"), [], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn summary(&self, series: Series) -> Result<SeriesSummary, StoreError> {
        let column = series.value_column();
        let sql = format!(
            "SELECT AVG({column}), MIN({column}), MAX({column}) FROM {}",
            series.clean_table()
        );
        let summary = self.conn.query_row(&sql, [], |row| {
            Ok(SeriesSummary {
                avg: row.get(0)?,
                min: row.get(1)?,
                max: row.get(2)?,
            })
        })?;
        Ok(summary)
    }

    fn merged_rows(&self) -> Result<Vec<MergedRecord>, StoreError> {
        let mut stmt = self.conn.prepare(MERGED_SELECT)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (month, year, month_num, season, wage_index, cpi, wage_to_cpi_ratio) = row?;
            out.push(MergedRecord {
                month: month
                    .parse::<Month>()
                    .map_err(|e| StoreError::Decode(e.to_string()))?,
                year,
                month_num,
                season: season.parse::<Season>().map_err(StoreError::Decode)?,
                wage_index,
                cpi,
                wage_to_cpi_ratio,
            });
        }
        Ok(out)
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn create_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn bulk_insert_raw(&mut self, series: Series, rows: &[RawObservation]) -> Result<usize, StoreError> {
        let sql = format!(
            "INSERT INTO {} (month_code, value_text, source, fetched_at) VALUES (?1, ?2, ?3, ?4)",
            series.raw_table()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        for row in rows {
            stmt.execute(params![
                row.month_code,
                row.value_text,
                row.source,
                row.fetched_at.to_rfc3339()
            ])?;
        }
        debug!(table = series.raw_table(), rows = rows.len(), "inserted raw rows");
        Ok(rows.len())
    }

    fn bulk_insert_clean(&mut self, batch: &CleanBatch) -> Result<usize, StoreError> {
        let table = batch.series.clean_table();
        let sql = format!(
            "INSERT INTO {table} (month, {}) VALUES (?1, ?2)",
            batch.series.value_column()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        for obs in &batch.observations {
            let month = obs.month.to_string();
            stmt.execute(params![month, obs.value]).map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref code, _) if code.code == ErrorCode::ConstraintViolation => {
                    StoreError::DuplicateKey {
                        table,
                        month: month.clone(),
                    }
                }
                other => StoreError::Sqlite(other),
            })?;
        }
        debug!(table, rows = batch.len(), "inserted clean rows");
        Ok(batch.len())
    }

    fn create_views(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(VIEWS_SQL)?;
        Ok(())
    }

    fn query(&self, query: &Query) -> Result<QueryOutput, StoreError> {
        Ok(match query {
            Query::RowCount(relation) => QueryOutput::RowCount(self.count(relation.name())?),
            Query::SeriesSummary(series) => QueryOutput::SeriesSummary(self.summary(*series)?),
            Query::Merged => QueryOutput::Merged(self.merged_rows()?),
        })
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
