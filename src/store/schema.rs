//! SQL definitions for the relational backends (SQLite dialect).

pub const MERGED_VIEW: &str = "wage_cpi_merged_v";

/// Raw tables are created once and appended to; clean tables are rebuilt.
///
/// The view is dropped first because it depends on the clean tables.
pub const SCHEMA_SQL: &str = r#"
-- raw, append-only
CREATE TABLE IF NOT EXISTS wage_index_raw (
    month_code  TEXT NOT NULL,
    value_text  TEXT,
    source      TEXT,
    fetched_at  TEXT
);
CREATE TABLE IF NOT EXISTS cpi_raw (
    month_code  TEXT NOT NULL,
    value_text  TEXT,
    source      TEXT,
    fetched_at  TEXT
);

DROP VIEW IF EXISTS wage_cpi_merged_v;

-- clean, replaced every load
DROP TABLE IF EXISTS wage_index_clean;
CREATE TABLE wage_index_clean (
    month       TEXT NOT NULL PRIMARY KEY,
    wage_index  REAL NOT NULL
);
DROP TABLE IF EXISTS cpi_clean;
CREATE TABLE cpi_clean (
    month  TEXT NOT NULL PRIMARY KEY,
    cpi    REAL NOT NULL
);
"#;

pub const VIEWS_SQL: &str = r#"
DROP VIEW IF EXISTS wage_cpi_merged_v;
CREATE VIEW wage_cpi_merged_v AS
SELECT
    w.month                                 AS month,
    CAST(substr(w.month, 1, 4) AS INTEGER)  AS year,
    CAST(substr(w.month, 6, 2) AS INTEGER)  AS month_num,
    CASE
        WHEN CAST(substr(w.month, 6, 2) AS INTEGER) IN (12, 1, 2) THEN 'Winter'
        WHEN CAST(substr(w.month, 6, 2) AS INTEGER) IN (3, 4, 5) THEN 'Spring'
        WHEN CAST(substr(w.month, 6, 2) AS INTEGER) IN (6, 7, 8) THEN 'Summer'
        ELSE 'Autumn'
    END                                     AS season,
    w.wage_index                            AS wage_index,
    c.cpi                                   AS cpi,
    (w.wage_index / c.cpi)                  AS wage_to_cpi_ratio
FROM wage_index_clean w
INNER JOIN cpi_clean c
    ON c.month = w.month;
"#;

pub const MERGED_SELECT: &str = "SELECT month, year, month_num, season, wage_index, cpi, wage_to_cpi_ratio \
     FROM wage_cpi_merged_v ORDER BY month";
