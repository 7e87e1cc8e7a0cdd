//! buddy-graph: Dialogue engine for the shopping assistant
//!
//! Conversations run over a small directed graph of nodes. Each node
//! mutates a per-thread [`ConversationState`]; conditional edges pick the
//! next node with pure routers over that state. [`ShoppingAssistant`] wraps
//! the graph with per-thread session storage and all-or-nothing turns.

pub mod assistant;
pub mod context;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod preference;
pub mod related;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use assistant::ShoppingAssistant;
pub use context::{AppContext, AssistantConfig};
pub use error::{Error, Result};
pub use graph::{Graph, GraphBuilder, Node, NodeName, Router, Traversal};
pub use nodes::{dialogue_graph, NO_RECOMMENDATION_MESSAGE, WELCOME_MESSAGE};
pub use preference::CustomerPreference;
pub use related::RelatedPreference;
pub use session::{SessionHandle, SessionStore};
pub use state::{ConversationState, Recommendation};
