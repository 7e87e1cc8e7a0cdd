//! Error types for the dialogue graph

use thiserror::Error;

use crate::graph::NodeName;

/// Result type alias using buddy-graph Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running the dialogue graph
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the chat model layer
    #[error(transparent)]
    Ai(#[from] buddy_ai::Error),

    /// An error from the search backend or product catalog
    #[error(transparent)]
    Retrieval(#[from] buddy_retrieval::Error),

    /// A tool call arrived without a required argument
    #[error("malformed {tool} call: missing {missing}")]
    MalformedToolCall {
        tool: &'static str,
        missing: &'static str,
    },

    /// A router selected a successor it never declared
    #[error("router at {node} selected undeclared successor {target}")]
    UndeclaredSuccessor { node: NodeName, target: NodeName },

    /// The graph failed construction-time validation
    #[error("invalid graph: {0}")]
    Graph(String),
}
