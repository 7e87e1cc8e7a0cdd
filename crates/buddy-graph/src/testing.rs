//! Scripted test doubles shared by the graph tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use buddy_ai::{ChatModel, Message, ToolSchema};
use buddy_retrieval::{ProductCatalog, ProductRow, ProductSearch, SearchHit};

use crate::context::{AppContext, AssistantConfig};

/// Chat model that replays scripted replies in order.
///
/// Records every request so tests can assert on what was sent. Once the
/// script is exhausted it answers with a plain "ok".
pub struct ScriptedModel {
    replies: Mutex<Vec<buddy_ai::Result<Message>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<Message>>>,
    tool_names: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<buddy_ai::Result<Message>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            tool_names: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }

    /// Tool names offered on each call, in call order
    pub fn tool_names(&self) -> Vec<Vec<String>> {
        self.tool_names.lock().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> buddy_ai::Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(messages.to_vec());
        self.tool_names.lock().push(
            tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
        );

        let mut replies = self.replies.lock();
        if replies.is_empty() {
            Ok(Message::assistant_text("ok"))
        } else {
            replies.remove(0)
        }
    }
}

/// Search backend that replays scripted hit lists in order.
///
/// Records each query and the result count requested with it; an
/// exhausted script returns no hits.
pub struct ScriptedSearch {
    results: Mutex<Vec<Vec<SearchHit>>>,
    queries: Mutex<Vec<String>>,
    num_results: Mutex<Vec<usize>>,
}

impl ScriptedSearch {
    pub fn new(results: Vec<Vec<SearchHit>>) -> Self {
        Self {
            results: Mutex::new(results),
            queries: Mutex::new(Vec::new()),
            num_results: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    /// Result counts requested, in call order
    pub fn num_results(&self) -> Vec<usize> {
        self.num_results.lock().clone()
    }
}

#[async_trait]
impl ProductSearch for ScriptedSearch {
    async fn search(
        &self,
        query_text: &str,
        _columns: &[String],
        num_results: usize,
    ) -> buddy_retrieval::Result<Vec<SearchHit>> {
        self.queries.lock().push(query_text.to_string());
        self.num_results.lock().push(num_results);

        let mut results = self.results.lock();
        if results.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(results.remove(0))
        }
    }
}

/// In-memory catalog keyed by product id
pub struct MapCatalog {
    rows: HashMap<i64, ProductRow>,
}

impl MapCatalog {
    pub fn new(rows: Vec<ProductRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.product_id, r)).collect(),
        }
    }
}

#[async_trait]
impl ProductCatalog for MapCatalog {
    async fn fetch_by_ids(&self, ids: &[i64]) -> buddy_retrieval::Result<Vec<ProductRow>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect())
    }
}

pub fn row(product_id: i64, title: &str, final_price: &str) -> ProductRow {
    ProductRow {
        product_id,
        title: title.to_string(),
        final_price: final_price.to_string(),
        category: None,
    }
}

/// Context over the given doubles; callers keep their own [`Arc`]s when
/// they need to inspect recorded calls afterwards
pub fn context(
    model: Arc<ScriptedModel>,
    search: Arc<ScriptedSearch>,
    catalog: Arc<MapCatalog>,
) -> AppContext {
    AppContext::new(model, search, catalog, AssistantConfig::default())
}

/// Context whose doubles have nothing scripted, for nodes that should not
/// touch the model or the backends
pub fn quiet_context() -> AppContext {
    context(
        Arc::new(ScriptedModel::new(vec![])),
        Arc::new(ScriptedSearch::new(vec![])),
        Arc::new(MapCatalog::new(vec![])),
    )
}
