//! Conversation state threaded through the dialogue graph

use buddy_ai::Message;
use buddy_retrieval::SearchHit;
use serde::{Deserialize, Serialize};

use crate::preference::CustomerPreference;
use crate::related::RelatedPreference;

/// Ranked product ids with their similarity scores.
///
/// The two lists are parallel: `product_ids[i]` scored `scores[i]`, in the
/// order the search backend returned the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_ids: Vec<i64>,
    pub scores: Vec<f64>,
}

impl Recommendation {
    /// Build a recommendation from search hits, preserving their order
    pub fn from_hits(hits: &[SearchHit]) -> Self {
        Self {
            product_ids: hits.iter().map(|h| h.product_id).collect(),
            scores: hits.iter().map(|h| h.score).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    /// Iterate (id, score) pairs in stored order
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.product_ids
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
    }
}

/// Per-thread conversation state.
///
/// Mutated only by graph nodes within one engine run. The session store
/// hands out one snapshot per thread and commits it back after a
/// successful turn, so a failed turn never leaves partial updates behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Message history, append-only
    pub messages: Vec<Message>,
    /// Text of the final message, recomputed each turn; absent while the
    /// thread holds at most the greeting
    pub last_user_text: Option<String>,
    pub customer_preference: Option<CustomerPreference>,
    pub recommendation: Option<Recommendation>,
    pub related_preference: Option<RelatedPreference>,
    pub related_recommendation: Option<Recommendation>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the history
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recently appended message
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
