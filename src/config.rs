//! Run configuration.
//!
//! Everything a run needs (month window, file locations, HTTP settings and
//! the per-source column contract) lives in one [`PipelineConfig`] built at
//! startup and passed down explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clean::ColumnMapping;
use crate::domain::{MonthWindow, Series};

pub const WAGE_PX_URL: &str =
    "https://px.hagstofa.is/pxis/pxweb/is/Samfelag__launogtekjur__2_lvt__1_manadartolur/LAU04000.px";
pub const CPI_PX_URL: &str = "https://px.hagstofa.is/pxis/pxweb/is/Efnahagur__visitolur__1_vnv__1_vnv/VIS01002.px/";

/// Environment fallback for `--data-dir`.
pub const ENV_DATA_DIR: &str = "WAGE_CPI_DATA_DIR";
/// Environment fallback for `--db`.
pub const ENV_DB_PATH: &str = "WAGE_CPI_DB";

const DEFAULT_DB_FILE: &str = "iceland_wage_cpi.sqlite";
const MERGED_EXPORT_FILE: &str = "wage_cpi_merged_from_sql.csv";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub window: MonthWindow,
    pub paths: DataPaths,
    pub http: HttpConfig,
    pub wage: SeriesSource,
    pub cpi: SeriesSource,
}

impl PipelineConfig {
    /// Default sources and window rooted at `base_dir`.
    pub fn new(base_dir: PathBuf, db_path: Option<PathBuf>) -> Self {
        Self {
            window: MonthWindow::default(),
            paths: DataPaths::new(base_dir, db_path),
            http: HttpConfig::default(),
            wage: SeriesSource::new(Series::Wage, WAGE_PX_URL),
            cpi: SeriesSource::new(Series::Cpi, CPI_PX_URL),
        }
    }

    pub fn source(&self, series: Series) -> &SeriesSource {
        match series {
            Series::Wage => &self.wage,
            Series::Cpi => &self.cpi,
        }
    }
}

/// File layout under the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub db_path: PathBuf,
}

impl DataPaths {
    pub fn new(base_dir: PathBuf, db_path: Option<PathBuf>) -> Self {
        let data = base_dir.join("data");
        Self {
            raw_dir: data.join("raw"),
            processed_dir: data.join("processed"),
            db_path: db_path.unwrap_or_else(|| base_dir.join(DEFAULT_DB_FILE)),
        }
    }

    /// `data/raw/{wage,cpi}_raw.csv`
    pub fn raw_file(&self, series: Series) -> PathBuf {
        self.raw_dir.join(format!("{}_raw.csv", file_stem(series)))
    }

    /// `data/processed/{wage,cpi}_clean.csv`
    pub fn clean_file(&self, series: Series) -> PathBuf {
        self.processed_dir.join(format!("{}_clean.csv", file_stem(series)))
    }

    pub fn merged_export(&self) -> PathBuf {
        self.processed_dir.join(MERGED_EXPORT_FILE)
    }
}

fn file_stem(series: Series) -> &'static str {
    match series {
        Series::Wage => "wage",
        Series::Cpi => "cpi",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "PXFetcher".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Where a series comes from and how its raw columns are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSource {
    pub series: Series,
    pub px_url: String,
    pub columns: ColumnMapping,
}

impl SeriesSource {
    pub fn new(series: Series, px_url: &str) -> Self {
        Self {
            series,
            px_url: px_url.to_string(),
            columns: ColumnMapping::default(),
        }
    }
}

/// Pick the base directory: explicit flag, then `WAGE_CPI_DATA_DIR`, then `.`.
pub fn resolve_base_dir(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(ENV_DATA_DIR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Pick the SQLite path: explicit flag, then `WAGE_CPI_DB`, else derived from the base dir.
pub fn resolve_db_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(ENV_DB_PATH).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_data_layout() {
        let paths = DataPaths::new(PathBuf::from("/work"), None);
        assert_eq!(paths.raw_file(Series::Wage), PathBuf::from("/work/data/raw/wage_raw.csv"));
        assert_eq!(paths.raw_file(Series::Cpi), PathBuf::from("/work/data/raw/cpi_raw.csv"));
        assert_eq!(paths.clean_file(Series::Cpi), PathBuf::from("/work/data/processed/cpi_clean.csv"));
        assert_eq!(
            paths.merged_export(),
            PathBuf::from("/work/data/processed/wage_cpi_merged_from_sql.csv")
        );
        assert_eq!(paths.db_path, PathBuf::from("/work/iceland_wage_cpi.sqlite"));
    }

    #[test]
    fn explicit_db_path_wins() {
        let paths = DataPaths::new(PathBuf::from("/work"), Some(PathBuf::from("/tmp/x.sqlite")));
        assert_eq!(paths.db_path, PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn explicit_base_dir_flag_wins() {
        assert_eq!(resolve_base_dir(Some(Path::new("/flag"))), PathBuf::from("/flag"));
    }

    #[test]
    fn sources_are_selected_by_series() {
        let config = PipelineConfig::new(PathBuf::from("."), None);
        assert_eq!(config.source(Series::Wage).px_url, WAGE_PX_URL);
        assert_eq!(config.source(Series::Cpi).series, Series::Cpi);
        assert_eq!(config.window, MonthWindow::default());
    }
}
