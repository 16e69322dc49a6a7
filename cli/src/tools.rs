//! Demo tools exposed by the binary.
//!
//! Each tool is a plain async function over `serde`/`schemars` types; the
//! registry derives the schemas the model sees from those types.

use bridge_application::CallContext;
use bridge_domain::DomainError;
use bridge_infrastructure::{FunctionTool, ToolRegistry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PoemInput {
    /// Number of lines to write
    pub line_count: u32,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PoemOutput {
    pub poem: String,
}

async fn poem(_ctx: CallContext, input: PoemInput) -> Result<PoemOutput, Infallible> {
    Ok(PoemOutput {
        poem: "a line of poem\n".repeat(input.line_count as usize),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AttackInput {
    /// Name of the creature to attack
    pub target: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AttackOutput {
    pub outcome: String,
}

async fn attack(_ctx: CallContext, input: AttackInput) -> Result<AttackOutput, String> {
    if input.target.trim().is_empty() {
        return Err("nothing to attack".to_string());
    }
    Ok(AttackOutput {
        outcome: format!("You attack the {}.", input.target),
    })
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveInput {
    pub direction: Direction,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MoveOutput {
    pub moved: Direction,
    pub position: String,
}

async fn move_to(_ctx: CallContext, input: MoveInput) -> Result<MoveOutput, Infallible> {
    let position = match input.direction {
        Direction::North => "(0, 1)",
        Direction::South => "(0, -1)",
        Direction::East => "(1, 0)",
        Direction::West => "(-1, 0)",
    };
    Ok(MoveOutput {
        moved: input.direction,
        position: position.to_string(),
    })
}

/// Build the registry of demo tools.
pub fn build_registry() -> Result<ToolRegistry, DomainError> {
    let mut registry = ToolRegistry::new();
    registry.register("poem", "Return a poem", FunctionTool::new(poem))?;
    registry.register("attack", "Attack a target", FunctionTool::new(attack))?;
    registry.register("move", "Move one step in a direction", FunctionTool::new(move_to))?;
    Ok(registry)
}
