//! Semantic product search over Databricks Vector Search

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column that carries the product identifier in search results
const ID_COLUMN: &str = "product_id";

/// One ranked row from the search backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub product_id: i64,
    pub score: f64,
}

/// Trait for semantic product search backends
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Search for products matching `query_text`.
    ///
    /// Returns at most `num_results` rows in the backend's ranking order,
    /// or an empty vec when nothing matches.
    async fn search(
        &self,
        query_text: &str,
        columns: &[String],
        num_results: usize,
    ) -> Result<Vec<SearchHit>>;
}

/// Client for a Databricks Vector Search index
pub struct VectorSearchClient {
    client: reqwest::Client,
    host: String,
    token: String,
    index: String,
}

impl VectorSearchClient {
    /// Default fully qualified index name
    pub const DEFAULT_INDEX: &'static str = "main.default.best_buy_products_index";

    /// Create a client for a fully qualified index name
    pub fn new(
        host: impl Into<String>,
        token: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            token: token.into(),
            index: index.into(),
        }
    }
}

#[async_trait]
impl ProductSearch for VectorSearchClient {
    async fn search(
        &self,
        query_text: &str,
        columns: &[String],
        num_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/api/2.0/vector-search/indexes/{}/query",
            self.host.trim_end_matches('/'),
            self.index
        );
        let request = QueryRequest {
            query_text: query_text.to_string(),
            columns: columns.to_vec(),
            num_results,
        };

        tracing::debug!(index = %self.index, num_results, "running similarity search");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { message });
        }

        let body: QueryResponse = response.json().await?;
        parse_hits(body)
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_text: String,
    columns: Vec<String>,
    num_results: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    manifest: Option<Manifest>,
    #[serde(default)]
    result: Option<ResultData>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    columns: Vec<Column>,
}

#[derive(Debug, Deserialize)]
struct Column {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    #[serde(default)]
    data_array: Vec<Vec<serde_json::Value>>,
}

/// Extract (id, score) pairs from a query response.
///
/// The id comes from the manifest's `product_id` column; the score is the
/// trailing element the backend appends to every row. Rows that cannot be
/// coerced are dropped with a warning rather than failing the search.
fn parse_hits(body: QueryResponse) -> Result<Vec<SearchHit>> {
    let rows = match body.result {
        Some(result) if !result.data_array.is_empty() => result.data_array,
        _ => return Ok(vec![]),
    };

    let manifest = body
        .manifest
        .ok_or_else(|| Error::UnexpectedResponse("missing manifest".to_string()))?;
    let id_index = manifest
        .columns
        .iter()
        .position(|c| c.name == ID_COLUMN)
        .ok_or_else(|| {
            Error::UnexpectedResponse(format!("no {ID_COLUMN} column in manifest"))
        })?;

    let mut hits = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.get(id_index).and_then(value_as_i64);
        let score = row.last().and_then(value_as_f64);
        match (id, score) {
            (Some(product_id), Some(score)) => hits.push(SearchHit { product_id, score }),
            _ => tracing::warn!(?row, "dropping uncoercible search row"),
        }
    }

    Ok(hits)
}

/// Coerce a JSON value to an integer id (the REST API stringifies columns)
fn value_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_hits_typical_response() {
        let body = response(json!({
            "manifest": {
                "column_count": 4,
                "columns": [
                    {"name": "product_id"},
                    {"name": "title"},
                    {"name": "final_price"},
                    {"name": "score"}
                ]
            },
            "result": {
                "row_count": 2,
                "data_array": [
                    [101, "Dell XPS 13", "999.99", 0.91],
                    ["102", "HP Spectre", "1099.00", 0.87]
                ]
            }
        }));

        let hits = parse_hits(body).unwrap();
        assert_eq!(
            hits,
            vec![
                SearchHit { product_id: 101, score: 0.91 },
                SearchHit { product_id: 102, score: 0.87 },
            ]
        );
    }

    #[test]
    fn test_parse_hits_empty_result() {
        let body = response(json!({
            "manifest": {"columns": [{"name": "product_id"}]},
            "result": {"data_array": []}
        }));
        assert!(parse_hits(body).unwrap().is_empty());

        let body = response(json!({}));
        assert!(parse_hits(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hits_missing_manifest() {
        let body = response(json!({
            "result": {"data_array": [[1, 0.5]]}
        }));
        assert!(matches!(
            parse_hits(body),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_hits_missing_id_column() {
        let body = response(json!({
            "manifest": {"columns": [{"name": "title"}, {"name": "score"}]},
            "result": {"data_array": [["Dell", 0.5]]}
        }));
        assert!(matches!(
            parse_hits(body),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_hits_drops_uncoercible_rows() {
        let body = response(json!({
            "manifest": {"columns": [{"name": "product_id"}, {"name": "score"}]},
            "result": {
                "data_array": [
                    ["not-a-number", 0.9],
                    [7, 0.8],
                    [8, "also-not"]
                ]
            }
        }));

        let hits = parse_hits(body).unwrap();
        assert_eq!(hits, vec![SearchHit { product_id: 7, score: 0.8 }]);
    }

    #[test]
    fn test_query_request_shape() {
        let request = QueryRequest {
            query_text: "laptop".to_string(),
            columns: vec!["product_id".to_string(), "title".to_string()],
            num_results: 5,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["query_text"], "laptop");
        assert_eq!(value["num_results"], 5);
        assert_eq!(value["columns"][0], "product_id");
    }
}
