//! Public assistant facade over the dialogue graph

use std::sync::Arc;

use buddy_ai::{ChatModel, Message};
use buddy_retrieval::{ProductCatalog, ProductSearch};

use crate::context::{AppContext, AssistantConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::nodes::dialogue_graph;
use crate::session::SessionStore;
use crate::state::ConversationState;

/// The conversational shopping assistant.
///
/// Owns the dialogue graph, the backing services, and one conversation
/// state per thread id. Turns on the same thread are serialized; turns on
/// different threads run concurrently.
pub struct ShoppingAssistant {
    ctx: AppContext,
    graph: Graph,
    sessions: SessionStore,
}

impl ShoppingAssistant {
    /// Build an assistant over the given services.
    ///
    /// Fails only if the dialogue graph does not validate.
    pub fn new(
        model: Arc<dyn ChatModel>,
        search: Arc<dyn ProductSearch>,
        catalog: Arc<dyn ProductCatalog>,
        config: AssistantConfig,
    ) -> Result<Self> {
        Ok(Self {
            ctx: AppContext::new(model, search, catalog, config),
            graph: dialogue_graph()?,
            sessions: SessionStore::new(),
        })
    }

    /// Run one turn and return the assistant's replies, in order.
    ///
    /// An empty `user_text` runs the graph without adding a user message;
    /// on a fresh thread that produces the greeting. The graph runs
    /// against a copy of the stored state, which is committed only when
    /// the whole turn succeeds, so a failed turn leaves the thread exactly
    /// as it was, the user message included.
    pub async fn converse(&self, thread_id: &str, user_text: &str) -> Result<Vec<String>> {
        let handle = self.sessions.get_or_create(thread_id);
        let mut stored = handle.lock().await;

        let mut state = stored.clone();
        if !user_text.is_empty() {
            state.push_message(Message::user(user_text));
        }
        let before = state.messages.len();

        let traversal = self.graph.run(&mut state, &self.ctx).await?;
        tracing::debug!(thread = thread_id, hops = traversal.hops(), "turn complete");

        let replies = state.messages[before..]
            .iter()
            .filter(|m| m.is_assistant())
            .map(|m| m.text())
            .filter(|text| !text.is_empty())
            .collect();

        *stored = state;
        Ok(replies)
    }

    /// Forget the thread's history; the next turn starts fresh
    pub fn reset(&self, thread_id: &str) {
        self.sessions.reset(thread_id);
    }

    /// Copy of the thread's current state, if the thread exists
    pub async fn snapshot(&self, thread_id: &str) -> Option<ConversationState> {
        let handle = self.sessions.get(thread_id)?;
        let state = handle.lock().await.clone();
        Some(state)
    }
}
