//! Statistics Iceland PX-Web API integration.
//!
//! A table is fetched in two round-trips:
//! 1. `GET` the table metadata to learn the variable codes and values
//! 2. `POST` a selection (every month, first value of every other variable)
//!    asking for a JSON-stat2 dataset
//!
//! The dataset is flattened to one `RawObservation` per month.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{HttpConfig, SeriesSource};
use crate::domain::RawObservation;
use crate::error::AppError;

/// Rewrite a browser (`/pxweb/`) table URL into its API endpoint.
///
/// `.../pxweb/is/A__b__c/T.px/` → `.../api/v1/is/A/b/c/T.px`
pub fn pxweb_to_api(url: &str) -> String {
    url.replace("/pxweb/", "/api/v1/")
        .replace("__", "/")
        .trim_end_matches('/')
        .to_string()
}

/// Observations of one table plus the name of its time dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSeries {
    /// Id of the time dimension (e.g. `Mánuður`), used as the raw CSV header.
    pub month_header: String,
    pub rows: Vec<RawObservation>,
}

pub struct PxClient {
    client: Client,
}

impl PxClient {
    pub fn new(http: &HttpConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .timeout(http.timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn fetch_series(&self, source: &SeriesSource) -> Result<FetchedSeries, AppError> {
        let api = pxweb_to_api(&source.px_url);
        info!(series = %source.series, url = %api, "fetching PX table");

        let meta: TableMeta = self.get_json(&api)?;
        let query = build_query(&meta)?;
        let dataset: JsonStatDataset = self.post_json(&api, &query)?;

        let fetched = decode_dataset(&dataset, &source.px_url, Utc::now())?;
        info!(series = %source.series, rows = fetched.rows.len(), "fetched PX table");
        Ok(fetched)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("PX metadata request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("PX metadata request failed with status {}.", resp.status()),
            ));
        }
        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse PX metadata: {e}")))
    }

    fn post_json<T: DeserializeOwned>(&self, url: &str, body: &PxQuery) -> Result<T, AppError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| AppError::new(4, format!("PX data request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("PX data request failed with status {}.", resp.status()),
            ));
        }
        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse PX JSON-stat2 response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct TableMeta {
    variables: Vec<Variable>,
}

#[derive(Debug, Deserialize)]
struct Variable {
    code: String,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PxQuery {
    query: Vec<Selection>,
    response: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct Selection {
    code: String,
    selection: Filter,
}

#[derive(Debug, Serialize)]
struct Filter {
    filter: &'static str,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    format: &'static str,
}

/// Every value of the first (time) variable; the first value of each other one.
fn build_query(meta: &TableMeta) -> Result<PxQuery, AppError> {
    let (time, others) = meta
        .variables
        .split_first()
        .ok_or_else(|| AppError::new(4, "PX metadata lists no variables."))?;

    let mut query = vec![Selection {
        code: time.code.clone(),
        selection: Filter {
            filter: "item",
            values: time.values.clone(),
        },
    }];
    for var in others {
        let first = var
            .values
            .first()
            .ok_or_else(|| AppError::new(4, format!("PX variable '{}' has no values.", var.code)))?;
        query.push(Selection {
            code: var.code.clone(),
            selection: Filter {
                filter: "item",
                values: vec![first.clone()],
            },
        });
    }
    debug!(variables = query.len(), months = time.values.len(), "built PX query");

    Ok(PxQuery {
        query,
        response: ResponseFormat { format: "json-stat2" },
    })
}

#[derive(Debug, Deserialize)]
struct JsonStatDataset {
    id: Vec<String>,
    size: Vec<usize>,
    dimension: BTreeMap<String, Dimension>,
    value: Values,
    #[serde(default)]
    status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    category: Category,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(default)]
    index: Option<CategoryIndex>,
    #[serde(default)]
    label: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryIndex {
    Ordered(Vec<String>),
    Positions(BTreeMap<String, usize>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Values {
    Dense(Vec<Option<f64>>),
    Sparse(BTreeMap<String, Option<f64>>),
}

impl Values {
    fn get(&self, idx: usize) -> Option<f64> {
        match self {
            Values::Dense(values) => values.get(idx).copied().flatten(),
            Values::Sparse(values) => values.get(&idx.to_string()).copied().flatten(),
        }
    }
}

impl Category {
    /// Category codes in dataset order.
    fn codes(&self) -> Vec<String> {
        match &self.index {
            Some(CategoryIndex::Ordered(codes)) => codes.clone(),
            Some(CategoryIndex::Positions(positions)) => {
                let mut pairs: Vec<(&String, &usize)> = positions.iter().collect();
                pairs.sort_by_key(|(_, pos)| **pos);
                pairs.into_iter().map(|(code, _)| code.clone()).collect()
            }
            // A single-category dimension may omit `index`.
            None => self.label.keys().cloned().collect(),
        }
    }
}

fn status_symbol(status: Option<&serde_json::Value>, idx: usize) -> Option<String> {
    match status? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.get(idx)?.as_str().map(str::to_string),
        serde_json::Value::Object(map) => map.get(&idx.to_string())?.as_str().map(str::to_string),
        _ => None,
    }
}

/// Flatten a JSON-stat2 dataset whose only non-singleton dimension is the first one.
fn decode_dataset(
    dataset: &JsonStatDataset,
    source: &str,
    fetched_at: DateTime<Utc>,
) -> Result<FetchedSeries, AppError> {
    let time_id = dataset
        .id
        .first()
        .ok_or_else(|| AppError::new(4, "JSON-stat2 dataset has no dimensions."))?;
    if dataset.size.len() != dataset.id.len() {
        return Err(AppError::new(4, "JSON-stat2 `id` and `size` disagree."));
    }
    if dataset.size[1..].iter().product::<usize>() != 1 {
        return Err(AppError::new(
            4,
            format!("Expected one value per month, got dimension sizes {:?}.", dataset.size),
        ));
    }

    let time_dim = dataset
        .dimension
        .get(time_id)
        .ok_or_else(|| AppError::new(4, format!("JSON-stat2 dimension '{time_id}' is missing.")))?;
    let codes = time_dim.category.codes();
    if codes.len() != dataset.size[0] {
        return Err(AppError::new(
            4,
            format!(
                "Dimension '{time_id}' lists {} categories but size is {}.",
                codes.len(),
                dataset.size[0]
            ),
        ));
    }

    let rows = codes
        .into_iter()
        .enumerate()
        .map(|(idx, code)| RawObservation {
            month_code: code,
            value_text: dataset
                .value
                .get(idx)
                .map(|v| v.to_string())
                .or_else(|| status_symbol(dataset.status.as_ref(), idx)),
            source: source.to_string(),
            fetched_at,
        })
        .collect();

    Ok(FetchedSeries {
        month_header: time_id.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn rewrites_browser_urls_to_api_endpoints() {
        assert_eq!(
            pxweb_to_api(crate::config::CPI_PX_URL),
            "https://px.hagstofa.is/pxis/api/v1/is/Efnahagur/visitolur/1_vnv/1_vnv/VIS01002.px"
        );
        assert_eq!(
            pxweb_to_api(crate::config::WAGE_PX_URL),
            "https://px.hagstofa.is/pxis/api/v1/is/Samfelag/launogtekjur/2_lvt/1_manadartolur/LAU04000.px"
        );
    }

    #[test]
    fn query_selects_all_months_and_first_of_others() {
        let meta: TableMeta = serde_json::from_value(json!({
            "title": "Vísitala neysluverðs",
            "variables": [
                {"code": "Mánuður", "values": ["2020M05", "2020M06"]},
                {"code": "Vísitala", "values": ["CPI", "CPIX"]},
                {"code": "Liður", "values": ["index", "change_A"]}
            ]
        }))
        .unwrap();

        let body = serde_json::to_value(build_query(&meta).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": [
                    {"code": "Mánuður", "selection": {"filter": "item", "values": ["2020M05", "2020M06"]}},
                    {"code": "Vísitala", "selection": {"filter": "item", "values": ["CPI"]}},
                    {"code": "Liður", "selection": {"filter": "item", "values": ["index"]}}
                ],
                "response": {"format": "json-stat2"}
            })
        );
    }

    #[test]
    fn query_needs_at_least_one_variable() {
        let meta = TableMeta { variables: vec![] };
        assert_eq!(build_query(&meta).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn decodes_json_stat2_in_category_order() {
        let dataset: JsonStatDataset = serde_json::from_value(json!({
            "version": "2.0",
            "class": "dataset",
            "id": ["Mánuður", "Eining"],
            "size": [3, 1],
            "dimension": {
                "Mánuður": {
                    "label": "Mánuður",
                    "category": {
                        "index": {"2020M06": 1, "2020M05": 0, "2020M07": 2},
                        "label": {"2020M05": "2020M05", "2020M06": "2020M06", "2020M07": "2020M07"}
                    }
                },
                "Eining": {"category": {"index": {"index": 0}, "label": {"index": "Vísitala"}}}
            },
            "value": [409.9, 410.3, null],
            "status": {"2": ".."}
        }))
        .unwrap();

        let fetched_at = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();
        let fetched = decode_dataset(&dataset, "https://px.example/LAU04000.px", fetched_at).unwrap();

        assert_eq!(fetched.month_header, "Mánuður");
        let got: Vec<(&str, Option<&str>)> = fetched
            .rows
            .iter()
            .map(|r| (r.month_code.as_str(), r.value_text.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2020M05", Some("409.9")),
                ("2020M06", Some("410.3")),
                ("2020M07", Some("..")),
            ]
        );
        assert!(fetched.rows.iter().all(|r| r.fetched_at == fetched_at));
    }

    #[test]
    fn rejects_datasets_with_more_than_one_value_per_month() {
        let dataset: JsonStatDataset = serde_json::from_value(json!({
            "id": ["Mánuður", "Eining"],
            "size": [1, 2],
            "dimension": {
                "Mánuður": {"category": {"index": ["2020M05"]}},
                "Eining": {"category": {"index": ["a", "b"]}}
            },
            "value": [1.0, 2.0]
        }))
        .unwrap();
        let err = decode_dataset(&dataset, "x", Utc::now()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn sparse_values_are_supported() {
        let dataset: JsonStatDataset = serde_json::from_value(json!({
            "id": ["Mánuður"],
            "size": [2],
            "dimension": {"Mánuður": {"category": {"index": ["2020M01", "2020M02"]}}},
            "value": {"1": 5.5}
        }))
        .unwrap();
        let fetched = decode_dataset(&dataset, "x", Utc::now()).unwrap();
        assert_eq!(fetched.rows[0].value_text, None);
        assert_eq!(fetched.rows[1].value_text.as_deref(), Some("5.5"));
    }
}
