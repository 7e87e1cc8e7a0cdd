//! Shared services and settings the dialogue nodes run against

use std::sync::Arc;

use buddy_ai::ChatModel;
use buddy_retrieval::{ProductCatalog, ProductSearch};

/// Tunables for product retrieval
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Number of hits requested by the primary product search
    pub top_k: usize,
    /// Columns requested from the search index
    pub search_columns: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            search_columns: vec![
                "product_id".to_string(),
                "title".to_string(),
                "final_price".to_string(),
            ],
        }
    }
}

/// Services available to every node.
///
/// Cloning is cheap; the adapters are shared behind [`Arc`].
#[derive(Clone)]
pub struct AppContext {
    pub model: Arc<dyn ChatModel>,
    pub search: Arc<dyn ProductSearch>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub config: AssistantConfig,
}

impl AppContext {
    pub fn new(
        model: Arc<dyn ChatModel>,
        search: Arc<dyn ProductSearch>,
        catalog: Arc<dyn ProductCatalog>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            model,
            search,
            catalog,
            config,
        }
    }
}
