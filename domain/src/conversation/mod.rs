//! Conversation domain: turns, history and model replies

pub mod entities;
pub mod response;

pub use entities::{Conversation, ConversationTurn};
pub use response::ModelReply;
