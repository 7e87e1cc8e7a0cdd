//! Dialogue graph construction and traversal

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::state::ConversationState;

/// Names of the dialogue nodes.
///
/// A closed set: routers can only ever select from these, so an unknown
/// node name is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeName {
    ManageState,
    Greeting,
    GatherPreference,
    ParsePreference,
    MatchProducts,
    Recommend,
    FindRelatedProducts,
    RecommendRelatedProduct,
    /// Terminal marker; never registered as a node
    End,
}

impl NodeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageState => "manage_state",
            Self::Greeting => "greeting",
            Self::GatherPreference => "gather_preference",
            Self::ParsePreference => "parse_preference",
            Self::MatchProducts => "match_products",
            Self::Recommend => "recommend",
            Self::FindRelatedProducts => "find_related_products",
            Self::RecommendRelatedProduct => "recommend_related_product",
            Self::End => "end",
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executable dialogue step.
///
/// Nodes mutate the state they are handed; side effects are limited to the
/// adapter calls reachable through the context.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()>;
}

/// Routing decision: a pure function of state.
///
/// Routers never consult external input directly; everything they need must
/// already be in the state.
pub type Router = fn(&ConversationState) -> NodeName;

/// Outgoing edge of a node
enum Edge {
    /// Always proceed to the named node
    Direct(NodeName),
    /// Select among the declared successors by inspecting state
    Conditional {
        router: Router,
        successors: Vec<NodeName>,
    },
}

/// Builder validating the graph shape before it can run
#[derive(Default)]
pub struct GraphBuilder {
    entry: Option<NodeName>,
    nodes: HashMap<NodeName, Arc<dyn Node>>,
    edges: HashMap<NodeName, Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its name
    pub fn add_node(mut self, name: NodeName, node: impl Node + 'static) -> Self {
        self.nodes.insert(name, Arc::new(node));
        self
    }

    /// Set the entry node
    pub fn set_entry(mut self, name: NodeName) -> Self {
        self.entry = Some(name);
        self
    }

    /// Add an unconditional edge
    pub fn add_edge(mut self, from: NodeName, to: NodeName) -> Self {
        self.edges.insert(from, Edge::Direct(to));
        self
    }

    /// Add a conditional edge with its declared successor set.
    ///
    /// The set must include [`NodeName::End`]; a router that cannot reach
    /// the terminal marker is refused at build time.
    pub fn add_conditional_edge(
        mut self,
        from: NodeName,
        router: Router,
        successors: &[NodeName],
    ) -> Self {
        self.edges.insert(
            from,
            Edge::Conditional {
                router,
                successors: successors.to_vec(),
            },
        );
        self
    }

    /// Validate the shape and produce an executable graph
    pub fn build(self) -> Result<Graph> {
        let entry = self
            .entry
            .ok_or_else(|| Error::Graph("no entry node set".to_string()))?;
        if !self.nodes.contains_key(&entry) {
            return Err(Error::Graph(format!("entry node {entry} is not registered")));
        }
        if self.nodes.contains_key(&NodeName::End) || self.edges.contains_key(&NodeName::End) {
            return Err(Error::Graph("end is a terminal marker, not a node".to_string()));
        }

        for name in self.nodes.keys() {
            if !self.edges.contains_key(name) {
                return Err(Error::Graph(format!("node {name} has no outgoing edge")));
            }
        }

        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(Error::Graph(format!("edge from unregistered node {from}")));
            }
            match edge {
                Edge::Direct(to) => self.check_target(*from, *to)?,
                Edge::Conditional { successors, .. } => {
                    if !successors.contains(&NodeName::End) {
                        return Err(Error::Graph(format!(
                            "successors of {from} do not include end"
                        )));
                    }
                    for to in successors {
                        self.check_target(*from, *to)?;
                    }
                }
            }
        }

        Ok(Graph {
            entry,
            nodes: self.nodes,
            edges: self.edges,
        })
    }

    fn check_target(&self, from: NodeName, to: NodeName) -> Result<()> {
        if to != NodeName::End && !self.nodes.contains_key(&to) {
            return Err(Error::Graph(format!(
                "edge {from} -> {to} targets an unregistered node"
            )));
        }
        Ok(())
    }
}

/// Record of one engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    /// Nodes executed, in order
    pub visited: Vec<NodeName>,
}

impl Traversal {
    /// Number of node executions in the run
    pub fn hops(&self) -> usize {
        self.visited.len()
    }
}

/// Executable dialogue graph
pub struct Graph {
    entry: NodeName,
    nodes: HashMap<NodeName, Arc<dyn Node>>,
    edges: HashMap<NodeName, Edge>,
}

impl Graph {
    /// Drive the graph from the entry node to the terminal marker.
    ///
    /// Executes one node at a time and resolves each successor from the
    /// node's edge. A router returning a successor outside its declared
    /// set aborts the run. The traversal length is a property of the
    /// validated graph shape; the engine itself does not truncate.
    pub async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<Traversal> {
        let mut current = self.entry;
        let mut visited = Vec::new();

        while current != NodeName::End {
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| Error::Graph(format!("node {current} is not registered")))?;

            tracing::debug!(node = %current, "executing node");
            node.run(state, ctx).await?;
            visited.push(current);

            current = match self.edges.get(&current) {
                Some(Edge::Direct(next)) => *next,
                Some(Edge::Conditional { router, successors }) => {
                    let next = router(state);
                    if !successors.contains(&next) {
                        return Err(Error::UndeclaredSuccessor {
                            node: current,
                            target: next,
                        });
                    }
                    next
                }
                None => {
                    return Err(Error::Graph(format!("node {current} has no outgoing edge")));
                }
            };
        }

        Ok(Traversal { visited })
    }

    /// The entry node
    pub fn entry(&self) -> NodeName {
        self.entry
    }
}
