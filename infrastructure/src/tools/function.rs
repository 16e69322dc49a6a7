//! Typed function tools
//!
//! [`FunctionTool`] turns an async Rust function into a [`ToolHandler`]. The
//! function's input and output types derive `serde` and
//! `schemars::JsonSchema`; their JSON Schema documents are generated once,
//! when the tool is built, and later turned into domain schemas by the
//! registry.
//!
//! ```ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct PoemInput { line_count: u32 }
//!
//! #[derive(Serialize, JsonSchema)]
//! struct PoemOutput { poem: String }
//!
//! let tool = FunctionTool::new(|_ctx, input: PoemInput| async move {
//!     let poem = "a line of poem\n".repeat(input.line_count as usize);
//!     Ok::<_, Infallible>(PoemOutput { poem })
//! });
//! ```

use super::handler::{HandlerError, ToolHandler};
use async_trait::async_trait;
use bridge_application::ports::tool_executor::CallContext;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;

/// A tool backed by a typed async function `Fn(CallContext, I) -> Result<O, E>`.
pub struct FunctionTool<I, O, E, F> {
    function: F,
    input_schema: Value,
    output_schema: Value,
    _types: PhantomData<fn(I) -> Result<O, E>>,
}

impl<I, O, E, F, Fut> FunctionTool<I, O, E, F>
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Serialize + JsonSchema + Send + 'static,
    E: Display + Send + 'static,
    F: Fn(CallContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    pub fn new(function: F) -> Self {
        Self {
            function,
            input_schema: schemars::schema_for!(I).to_value(),
            output_schema: schemars::schema_for!(O).to_value(),
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<I, O, E, F, Fut> ToolHandler for FunctionTool<I, O, E, F>
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Serialize + JsonSchema + Send + 'static,
    E: Display + Send + 'static,
    F: Fn(CallContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    fn input_schema(&self) -> Value {
        self.input_schema.clone()
    }

    fn output_schema(&self) -> Value {
        self.output_schema.clone()
    }

    async fn call(&self, ctx: CallContext, arguments: Value) -> Result<Value, HandlerError> {
        let input: I =
            serde_json::from_value(arguments).map_err(|e| HandlerError::Decode(e.to_string()))?;
        let output = (self.function)(ctx, input)
            .await
            .map_err(|e| HandlerError::Failed(e.to_string()))?;
        serde_json::to_value(output).map_err(|e| HandlerError::Encode(e.to_string()))
    }
}
