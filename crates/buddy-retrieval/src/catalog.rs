//! Product catalog backed by a local JSONL file

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// One product row from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: i64,
    pub title: String,
    /// Price as displayed; source data mixes strings and numbers
    #[serde(deserialize_with = "string_or_number")]
    pub final_price: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Trait for product attribute lookup
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch rows for the given ids.
    ///
    /// Ids missing from the catalog are omitted; result order follows the
    /// input id order.
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>>;
}

/// In-memory catalog loaded from a JSONL file, one product object per line
pub struct JsonlCatalog {
    rows: HashMap<i64, ProductRow>,
}

impl JsonlCatalog {
    /// Load a catalog file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = BufReader::new(file);

        let mut rows = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: ProductRow =
                serde_json::from_str(&line).map_err(|e| Error::MalformedRow {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            rows.insert(row.product_id, row);
        }

        tracing::debug!(products = rows.len(), "loaded product catalog");
        Ok(Self { rows })
    }

    /// Number of products in the catalog
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for JsonlCatalog {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for price, got {other}"
        ))),
    }
}
