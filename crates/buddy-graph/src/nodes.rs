//! Dialogue nodes, routers, and the assembled shopping graph

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;

use buddy_ai::Message;

use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::graph::{Graph, GraphBuilder, Node, NodeName};
use crate::preference::{
    get_preference_schema, parse_customer_preference, GET_PREFERENCE_TOOL, PREFERENCE_TEMPLATE,
};
use crate::related::{get_related_products_schema, parse_related_preference, RELATED_TEMPLATE};
use crate::state::{ConversationState, Recommendation};

/// Greeting shown when a thread has no history yet
pub const WELCOME_MESSAGE: &str =
    "Welcome to Shopping Buddy! I can help you find the right electronic product. What are you looking for today?";

/// Reply when the search backend returned no rows for the preference
pub const NO_RECOMMENDATION_MESSAGE: &str =
    "Sorry, I couldn't find any products matching your preference.";

/// Rows requested by each related-category search; the configured top_k
/// applies to the primary search only
const RELATED_TOP_K: usize = 5;

/// Capture the latest user text before anything else runs.
///
/// On a fresh thread there is nothing to capture; the field is cleared so
/// stale text from an earlier snapshot can never leak into this turn.
struct ManageState;

#[async_trait]
impl Node for ManageState {
    async fn run(&self, state: &mut ConversationState, _ctx: &AppContext) -> Result<()> {
        state.last_user_text = if state.messages.len() > 1 {
            state.last_message().map(|m| m.text())
        } else {
            None
        };
        Ok(())
    }
}

/// Greet once, on the very first turn of a thread
struct Greeting;

#[async_trait]
impl Node for Greeting {
    async fn run(&self, state: &mut ConversationState, _ctx: &AppContext) -> Result<()> {
        if state.messages.is_empty() {
            state.push_message(Message::assistant_text(WELCOME_MESSAGE));
        }
        Ok(())
    }
}

/// Ask the model to gather the four preference fields.
///
/// The request is the preference instruction followed by the full thread
/// history; the reply (clarifying question or `get_preference` call) is
/// appended to the transcript.
struct GatherPreference;

#[async_trait]
impl Node for GatherPreference {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()> {
        let mut request = vec![Message::system(PREFERENCE_TEMPLATE)];
        request.extend(state.messages.iter().cloned());

        let tools = [get_preference_schema()];
        let response = ctx.model.invoke(&request, Some(&tools)).await?;
        state.push_message(response);
        Ok(())
    }
}

/// Turn the `get_preference` call into structured state and acknowledge it
struct ParsePreference;

#[async_trait]
impl Node for ParsePreference {
    async fn run(&self, state: &mut ConversationState, _ctx: &AppContext) -> Result<()> {
        let (call_id, arguments) = match state.last_message() {
            Some(message) => match message.tool_calls().first() {
                Some((id, _, args)) => (id.to_string(), (*args).clone()),
                None => {
                    return Err(Error::MalformedToolCall {
                        tool: GET_PREFERENCE_TOOL,
                        missing: "tool call",
                    })
                }
            },
            None => {
                return Err(Error::MalformedToolCall {
                    tool: GET_PREFERENCE_TOOL,
                    missing: "tool call",
                })
            }
        };

        let preference = parse_customer_preference(&arguments)?;
        tracing::debug!(category = %preference.category, "parsed customer preference");
        state.customer_preference = Some(preference);
        state.push_message(Message::tool_result(call_id, "Preference recorded."));
        Ok(())
    }
}

/// Run one semantic search against the stored preference
struct MatchProducts;

#[async_trait]
impl Node for MatchProducts {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()> {
        let Some(preference) = &state.customer_preference else {
            return Ok(());
        };

        let query = preference.to_query();
        let hits = ctx
            .search
            .search(&query, &ctx.config.search_columns, ctx.config.top_k)
            .await?;

        if hits.is_empty() {
            tracing::debug!("search returned no rows for the preference query");
        } else {
            state.recommendation = Some(Recommendation::from_hits(&hits));
        }
        Ok(())
    }
}

/// Present the matched products, or say nothing matched
struct Recommend;

#[async_trait]
impl Node for Recommend {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()> {
        let text = match &state.recommendation {
            Some(recommendation) => render_listing(recommendation, ctx).await?,
            None => NO_RECOMMENDATION_MESSAGE.to_string(),
        };
        state.push_message(Message::assistant_text(text));
        Ok(())
    }
}

/// Derive three related categories and search each for one extra product.
///
/// The model exchange here is scratch work: neither the instruction nor the
/// reply is appended to the transcript. Picks skip the primary
/// recommendation ids and anything already picked, so the three categories
/// can never surface the same product twice.
struct FindRelatedProducts;

#[async_trait]
impl Node for FindRelatedProducts {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()> {
        let listing = state.last_message().map(|m| m.text()).unwrap_or_default();
        let request = [
            Message::system(RELATED_TEMPLATE),
            Message::user(format!("Recommended Product: {listing}")),
        ];

        let tools = [get_related_products_schema()];
        let response = ctx.model.invoke(&request, Some(&tools)).await?;

        let arguments = match response.tool_calls().first() {
            Some((_, _, args)) => (*args).clone(),
            None => {
                tracing::debug!("related-category exchange produced no tool call");
                return Ok(());
            }
        };
        let preference = parse_related_preference(&arguments)?;

        let primary_ids: Vec<i64> = state
            .recommendation
            .as_ref()
            .map(|r| r.product_ids.clone())
            .unwrap_or_default();

        let mut related = Recommendation::default();
        for query in preference.to_list() {
            let hits = ctx
                .search
                .search(&query, &ctx.config.search_columns, RELATED_TOP_K)
                .await?;

            let pick = hits.iter().find(|hit| {
                !primary_ids.contains(&hit.product_id)
                    && !related.product_ids.contains(&hit.product_id)
            });
            if let Some(hit) = pick {
                related.product_ids.push(hit.product_id);
                related.scores.push(hit.score);
            }
        }

        state.related_preference = Some(preference);
        if !related.is_empty() {
            state.related_recommendation = Some(related);
        }
        Ok(())
    }
}

/// Present the related products when any were found
struct RecommendRelatedProduct;

#[async_trait]
impl Node for RecommendRelatedProduct {
    async fn run(&self, state: &mut ConversationState, ctx: &AppContext) -> Result<()> {
        if let Some(recommendation) = &state.related_recommendation {
            let text = render_listing(recommendation, ctx).await?;
            state.push_message(Message::assistant_text(text));
        }
        Ok(())
    }
}

/// Render a recommendation as one `title - price` line per product.
///
/// Lines are ordered by descending score; rows tied on score keep the
/// search backend's order. Ids the catalog does not know are dropped.
async fn render_listing(recommendation: &Recommendation, ctx: &AppContext) -> Result<String> {
    let rows = ctx.catalog.fetch_by_ids(&recommendation.product_ids).await?;
    let by_id: HashMap<i64, _> = rows.iter().map(|row| (row.product_id, row)).collect();

    let mut ranked: Vec<(i64, f64)> = recommendation.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let lines: Vec<String> = ranked
        .iter()
        .filter_map(|(id, _)| by_id.get(id))
        .map(|row| format!("{} - {}", row.title, row.final_price))
        .collect();
    Ok(lines.join("\n"))
}

fn greeting_router(state: &ConversationState) -> NodeName {
    if state.messages.len() > 1 {
        NodeName::GatherPreference
    } else {
        NodeName::End
    }
}

fn gather_router(state: &ConversationState) -> NodeName {
    let called_tool = state
        .last_message()
        .map(|m| m.has_tool_calls())
        .unwrap_or(false);
    if called_tool {
        NodeName::ParsePreference
    } else {
        NodeName::End
    }
}

fn recommend_router(state: &ConversationState) -> NodeName {
    if state.recommendation.is_some() {
        NodeName::FindRelatedProducts
    } else {
        NodeName::End
    }
}

/// Build the shopping dialogue graph.
///
/// The longest path visits every node exactly once, so a run executes at
/// most eight nodes before reaching the terminal marker.
pub fn dialogue_graph() -> Result<Graph> {
    GraphBuilder::new()
        .set_entry(NodeName::ManageState)
        .add_node(NodeName::ManageState, ManageState)
        .add_node(NodeName::Greeting, Greeting)
        .add_node(NodeName::GatherPreference, GatherPreference)
        .add_node(NodeName::ParsePreference, ParsePreference)
        .add_node(NodeName::MatchProducts, MatchProducts)
        .add_node(NodeName::Recommend, Recommend)
        .add_node(NodeName::FindRelatedProducts, FindRelatedProducts)
        .add_node(NodeName::RecommendRelatedProduct, RecommendRelatedProduct)
        .add_edge(NodeName::ManageState, NodeName::Greeting)
        .add_conditional_edge(
            NodeName::Greeting,
            greeting_router,
            &[NodeName::GatherPreference, NodeName::End],
        )
        .add_conditional_edge(
            NodeName::GatherPreference,
            gather_router,
            &[NodeName::ParsePreference, NodeName::End],
        )
        .add_edge(NodeName::ParsePreference, NodeName::MatchProducts)
        .add_edge(NodeName::MatchProducts, NodeName::Recommend)
        .add_conditional_edge(
            NodeName::Recommend,
            recommend_router,
            &[NodeName::FindRelatedProducts, NodeName::End],
        )
        .add_edge(NodeName::FindRelatedProducts, NodeName::RecommendRelatedProduct)
        .add_edge(NodeName::RecommendRelatedProduct, NodeName::End)
        .build()
}
