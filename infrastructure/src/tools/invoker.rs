//! Tool invoker
//!
//! Runs a single [`ToolCallRequest`] against a [`ToolRegistry`]:
//!
//! 1. Look up the tool; an unknown name yields an `UNKNOWN_TOOL` result.
//! 2. Validate the raw arguments against the input schema. Missing required
//!    fields, wrong types, values outside an enum and fields the schema does
//!    not declare all yield an `INVALID_ARGUMENT` result.
//! 3. Run the handler once, bounded by the call's timeout if any. Handler
//!    errors and timeouts yield a `HANDLER_FAILED` result.
//! 4. Validate the output against the output schema. A mismatch is returned
//!    as an [`OutputEncodeError`].
//!
//! Only step 4 can fail the call; every other problem is reported to the model
//! inside the [`ToolCallResult`].

use super::handler::HandlerError;
use super::registry::ToolRegistry;
use bridge_application::ports::tool_executor::CallContext;
use bridge_domain::{OutputEncodeError, ToolCallRequest, ToolCallResult, ToolError};
use std::time::Instant;
use tracing::{debug, warn};

/// Stateless executor of tool calls.
pub struct ToolInvoker;

impl ToolInvoker {
    pub async fn invoke(
        registry: &ToolRegistry,
        request: &ToolCallRequest,
        ctx: &CallContext,
    ) -> Result<ToolCallResult, OutputEncodeError> {
        let started = Instant::now();
        let call_id = request.call_id.as_str();
        let name = request.tool_name.as_str();
        let elapsed_ms = || started.elapsed().as_millis() as u64;

        let (descriptor, handler) = match registry.lookup(name) {
            Ok(found) => found,
            Err(error) => {
                debug!(tool = %name, "Unknown tool requested");
                let result = ToolCallResult::failure(call_id, name, error);
                return Ok(result.with_duration(elapsed_ms()));
            }
        };

        if let Err(violation) = descriptor.input_schema.validate(&request.arguments) {
            debug!(tool = %name, "Rejected arguments: {}", violation);
            return Ok(ToolCallResult::failure(
                call_id,
                name,
                ToolError::argument_decode(violation.to_string()),
            )
            .with_duration(elapsed_ms()));
        }

        debug!(tool = %name, call_id = %call_id, "Executing tool");
        let call = handler.call(ctx.clone(), request.arguments.clone());
        let outcome = match ctx.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(tool = %name, "Tool timed out after {:?}", limit);
                    return Ok(ToolCallResult::failure(
                        call_id,
                        name,
                        ToolError::timeout(name, limit.as_secs_f64()),
                    )
                    .with_duration(elapsed_ms()));
                }
            },
            None => call.await,
        };
        let duration_ms = elapsed_ms();

        let output = match outcome {
            Ok(output) => output,
            Err(HandlerError::Decode(message)) => {
                return Ok(ToolCallResult::failure(
                    call_id,
                    name,
                    ToolError::argument_decode(message),
                )
                .with_duration(duration_ms));
            }
            Err(HandlerError::Failed(message)) => {
                return Ok(ToolCallResult::failure(call_id, name, ToolError::handler(message))
                    .with_duration(duration_ms));
            }
            Err(HandlerError::Encode(message)) => {
                return Err(OutputEncodeError::new(name, message));
            }
        };

        descriptor
            .output_schema
            .validate(&output)
            .map_err(|violation| OutputEncodeError::from_violation(name, &violation))?;

        debug!(tool = %name, duration_ms, "Tool completed");
        Ok(ToolCallResult::success(call_id, name, output).with_duration(duration_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::function::FunctionTool;
    use crate::tools::handler::ToolHandler;
    use async_trait::async_trait;
    use bridge_domain::ToolErrorKind;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};
    use serde_json::{Value, json};
    use std::convert::Infallible;
    use std::time::Duration;

    #[derive(Deserialize, JsonSchema)]
    struct PoemInput {
        line_count: u32,
    }

    #[derive(Serialize, JsonSchema)]
    struct PoemOutput {
        poem: String,
    }

    #[derive(Deserialize, JsonSchema)]
    struct SleepInput {
        millis: u64,
    }

    /// Declares an output schema that its output does not satisfy.
    struct LyingTool;

    #[async_trait]
    impl ToolHandler for LyingTool {
        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        fn output_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "poem": { "type": "string" } },
                "required": ["poem"]
            })
        }

        async fn call(&self, _ctx: CallContext, _arguments: Value) -> Result<Value, HandlerError> {
            Ok(json!({ "verse": 1 }))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "poem",
                "Write a poem",
                FunctionTool::new(|_ctx, input: PoemInput| async move {
                    Ok::<_, Infallible>(PoemOutput {
                        poem: "a line of poem\n".repeat(input.line_count as usize),
                    })
                }),
            )
            .unwrap();
        registry
            .register(
                "sleep",
                "Sleep for a while",
                FunctionTool::new(|_ctx, input: SleepInput| async move {
                    tokio::time::sleep(Duration::from_millis(input.millis)).await;
                    Ok::<_, Infallible>(PoemOutput {
                        poem: String::new(),
                    })
                }),
            )
            .unwrap();
        registry
            .register(
                "refuse",
                "Always fails",
                FunctionTool::new(|_ctx, _input: PoemInput| async move {
                    Err::<PoemOutput, _>("writer's block")
                }),
            )
            .unwrap();
        registry.register("liar", "Bad output", LyingTool).unwrap();
        registry
    }

    fn ctx() -> CallContext {
        CallContext::new("poet_agent", "call_1_0")
    }

    async fn invoke(registry: &ToolRegistry, request: ToolCallRequest) -> ToolCallResult {
        ToolInvoker::invoke(registry, &request.with_call_id("call_1_0"), &ctx())
            .await
            .unwrap()
    }

    fn error_kind(result: &ToolCallResult) -> Option<ToolErrorKind> {
        result.error().map(|e| e.kind)
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let registry = registry();
        let result = invoke(
            &registry,
            ToolCallRequest::new("poem").with_arg("line_count", 3),
        )
        .await;

        assert!(result.is_success());
        assert_eq!(result.call_id, "call_1_0");
        assert!(result.metadata.duration_ms.is_some());
        let poem = result.output().unwrap()["poem"].as_str().unwrap();
        assert_eq!(poem, "a line of poem\na line of poem\na line of poem\n");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = registry();
        let result = invoke(&registry, ToolCallRequest::new("fly")).await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::UnknownTool));
    }

    #[tokio::test]
    async fn test_invoke_rejects_bad_arguments() {
        let registry = registry();
        let cases = [
            json!({}),
            json!({ "line_count": "three" }),
            json!({ "line_count": 3, "rhyme": true }),
            json!([3]),
            json!(null),
        ];

        for arguments in cases {
            let request = ToolCallRequest::new("poem").with_arguments(arguments);
            let result = invoke(&registry, request).await;
            assert_eq!(error_kind(&result), Some(ToolErrorKind::ArgumentDecode));
        }
    }

    #[tokio::test]
    async fn test_invoke_serde_decode_failure() {
        // Passes the schema check (integer) but overflows u32.
        let registry = registry();
        let result = invoke(
            &registry,
            ToolCallRequest::new("poem").with_arg("line_count", 5_000_000_000u64),
        )
        .await;
        assert_eq!(error_kind(&result), Some(ToolErrorKind::ArgumentDecode));
    }

    #[tokio::test]
    async fn test_invoke_handler_error() {
        let registry = registry();
        let result = invoke(
            &registry,
            ToolCallRequest::new("refuse").with_arg("line_count", 1),
        )
        .await;

        assert_eq!(error_kind(&result), Some(ToolErrorKind::Handler));
        assert_eq!(result.error().unwrap().message, "writer's block");
    }

    #[tokio::test]
    async fn test_invoke_timeout() {
        let registry = registry();
        let request = ToolCallRequest::new("sleep")
            .with_call_id("call_1_0")
            .with_arg("millis", 1_000);
        let ctx = ctx().with_timeout(Some(Duration::from_millis(10)));

        let result = ToolInvoker::invoke(&registry, &request, &ctx).await.unwrap();

        assert_eq!(error_kind(&result), Some(ToolErrorKind::Handler));
        assert!(result.error().unwrap().message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_invoke_output_mismatch_is_error() {
        let registry = registry();
        let request = ToolCallRequest::new("liar").with_call_id("call_1_0");

        let err = ToolInvoker::invoke(&registry, &request, &ctx()).await.unwrap_err();

        assert_eq!(err.tool_name, "liar");
    }
}
