//! Conversation domain entities

use crate::tool::entities::ToolCallRequest;
use crate::tool::value_objects::ToolCallResult;
use serde::{Deserialize, Serialize};

/// One immutable step in the exchange between user, model and tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ConversationTurn {
    UserMessage(String),
    ModelText(String),
    ToolCallRequest(ToolCallRequest),
    ToolCallResult(ToolCallResult),
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        ConversationTurn::UserMessage(content.into())
    }

    pub fn model_text(content: impl Into<String>) -> Self {
        ConversationTurn::ModelText(content.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConversationTurn::UserMessage(s) | ConversationTurn::ModelText(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolCallRequest> {
        match self {
            ConversationTurn::ToolCallRequest(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolCallResult> {
        match self {
            ConversationTurn::ToolCallResult(result) => Some(result),
            _ => None,
        }
    }
}

/// Append-only, ordered sequence of [`ConversationTurn`]s.
///
/// Turns can be added but never removed or edited. The dispatch loop works on
/// a copy of the caller's history, so a failed response leaves the caller's
/// conversation untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = ConversationTurn>) {
        self.turns.extend(turns);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationTurn> {
        self.turns.iter()
    }

    /// Number of tool results recorded so far.
    pub fn tool_result_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, ConversationTurn::ToolCallResult(_)))
            .count()
    }
}

impl FromIterator<ConversationTurn> for Conversation {
    fn from_iter<T: IntoIterator<Item = ConversationTurn>>(iter: T) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
