//! Model gateway adapters.

mod scripted;

pub use scripted::{ScriptError, ScriptedModel};
