//! Dispatch loop use case.
//!
//! Runs one `respond` call: alternates between asking the model for a reply
//! and executing the tools it requests, until the model answers in text or
//! the turn budget runs out.
//!
//! ```text
//!             ┌──────────────────────────────────────────────┐
//!             ▼                                              │
//!      AwaitingModel ──▶ ModelResponded ──▶ ToolRequested ──▶ ToolExecuted
//!                              │
//!                              └──▶ Final (text answer)
//! ```
//!
//! Every turn is appended to a copy of the caller's history in the order it
//! happens. Tool calls of one model reply run concurrently; their results are
//! appended in request order, all before the next model call.

use crate::agent::{AgentConfig, Response};
use crate::ports::model_gateway::{GatewayError, ModelRequest};
use crate::ports::observability::{SpanKind, SpanStatus};
use crate::ports::tool_executor::CallContext;
use crate::use_cases::shared::{SpanRecorder, check_cancelled, preview};
use bridge_domain::{
    Conversation, ConversationTurn, ModelReply, OutputEncodeError, ToolCallRequest, ToolCallResult,
};
use futures::future::join_all;
use serde_json::{Value, json};
use std::sync::atomic::AtomicU64;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, info, warn};

/// Errors that end a `respond` call.
#[derive(Error, Debug)]
pub enum RespondError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] GatewayError),

    #[error(transparent)]
    OutputEncode(#[from] OutputEncodeError),

    #[error("Model still requested tools after {max_turns} turns")]
    MaxTurnsExceeded { max_turns: usize },

    #[error("Response cancelled")]
    Cancelled,
}

impl RespondError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RespondError::Cancelled)
    }
}

enum LoopState {
    AwaitingModel,
    ModelResponded(ModelReply),
    ToolRequested(Vec<ToolCallRequest>),
    ToolExecuted,
    Final(String),
}

/// State of a single `respond` call.
pub(crate) struct DispatchLoop<'a> {
    config: &'a AgentConfig,
    spans: SpanRecorder<'a>,
    token: CancellationToken,
}

impl<'a> DispatchLoop<'a> {
    pub(crate) fn new(
        config: &'a AgentConfig,
        span_ids: &'a AtomicU64,
        token: CancellationToken,
    ) -> Self {
        Self {
            config,
            spans: SpanRecorder::new(config.observability(), span_ids),
            token,
        }
    }

    pub(crate) async fn run(
        self,
        history: &Conversation,
        input: String,
    ) -> Result<Response, RespondError> {
        info!(agent = %self.config.name(), "Responding to: {}", preview(&input, 100));

        let mut conversation = history.clone();
        conversation.push(ConversationTurn::UserMessage(input));

        let span = self.spans.start(
            SpanKind::Respond,
            self.config.name(),
            None,
            json!({ "history_len": history.len() }),
        );
        let outcome = self.drive(&mut conversation, span.id()).await;
        match &outcome {
            Ok(answer) => span.finish(
                SpanStatus::Ok,
                json!({ "answer": answer, "turns": conversation.len() }),
            ),
            Err(e) => span.finish(
                SpanStatus::error(e.to_string()),
                json!({ "turns": conversation.len() }),
            ),
        }

        let answer = outcome?;
        Ok(Response {
            history: conversation,
            answer,
        })
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        root_span: u64,
    ) -> Result<String, RespondError> {
        let max_turns = self.config.params().max_turns;
        let mut model_calls = 0usize;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if model_calls >= max_turns {
                        warn!(
                            agent = %self.config.name(),
                            "Dispatch loop exceeded max_turns ({})",
                            max_turns
                        );
                        return Err(RespondError::MaxTurnsExceeded { max_turns });
                    }
                    check_cancelled(&self.token)?;
                    model_calls += 1;
                    let reply = self.call_model(conversation, model_calls, root_span).await?;
                    LoopState::ModelResponded(reply.normalized())
                }
                LoopState::ModelResponded(ModelReply::Text(answer)) => {
                    conversation.push(ConversationTurn::ModelText(answer.clone()));
                    LoopState::Final(answer)
                }
                LoopState::ModelResponded(ModelReply::ToolCalls(calls)) => {
                    let calls = assign_call_ids(calls, model_calls);
                    conversation
                        .extend(calls.iter().cloned().map(ConversationTurn::ToolCallRequest));
                    LoopState::ToolRequested(calls)
                }
                LoopState::ToolRequested(calls) => {
                    debug!(
                        "Tool turn {}/{}: executing {} tool calls",
                        model_calls,
                        max_turns,
                        calls.len()
                    );
                    let results = self.execute_tools(&calls, root_span).await?;
                    conversation.extend(results.into_iter().map(ConversationTurn::ToolCallResult));
                    LoopState::ToolExecuted
                }
                LoopState::ToolExecuted => LoopState::AwaitingModel,
                LoopState::Final(answer) => {
                    info!(
                        agent = %self.config.name(),
                        "Response completed after {} model calls",
                        model_calls
                    );
                    return Ok(answer);
                }
            };
        }
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
        cycle: usize,
        parent: u64,
    ) -> Result<ModelReply, RespondError> {
        let model = self.config.model();
        let tools = self.config.tools().descriptors();
        let request = ModelRequest::new(self.config.instruction(), conversation, tools);

        let span = self.spans.start(
            SpanKind::ModelCall,
            model.model_id(),
            Some(parent),
            json!({ "cycle": cycle, "history_len": conversation.len(), "tools": tools.len() }),
        );
        debug!(
            model = %model.model_id(),
            "Sending {} turns with {} tools",
            conversation.len(),
            tools.len()
        );

        let send = model
            .send(request)
            .instrument(debug_span!("model_call", model = %model.model_id(), cycle));
        let reply = tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RespondError::Cancelled),
            reply = send => reply.map_err(RespondError::ModelUnavailable),
        };

        match &reply {
            Ok(reply) => span.finish(
                SpanStatus::Ok,
                json!({ "tool_calls": reply.tool_calls().len() }),
            ),
            Err(e) => {
                warn!(model = %model.model_id(), "Model call failed: {}", e);
                span.finish(SpanStatus::error(e.to_string()), Value::Null);
            }
        }
        reply
    }

    async fn execute_tools(
        &self,
        calls: &[ToolCallRequest],
        parent: u64,
    ) -> Result<Vec<ToolCallResult>, RespondError> {
        let futures = calls.iter().map(|call| self.execute_tool(call, parent));
        let results = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Err(RespondError::Cancelled),
            results = join_all(futures) => results,
        };
        results
            .into_iter()
            .map(|r| r.map_err(RespondError::from))
            .collect()
    }

    async fn execute_tool(
        &self,
        call: &ToolCallRequest,
        parent: u64,
    ) -> Result<ToolCallResult, OutputEncodeError> {
        let ctx = CallContext::new(self.config.name(), call.call_id.clone())
            .with_timeout(self.config.params().tool_timeout)
            .with_cancellation(self.token.child_token());

        let span = self.spans.start(
            SpanKind::ToolCall,
            &call.tool_name,
            Some(parent),
            json!({ "call_id": call.call_id, "arguments": call.arguments }),
        );

        let outcome = self
            .config
            .tools()
            .execute(call, &ctx)
            .instrument(debug_span!("tool_call", tool = %call.tool_name, call_id = %call.call_id))
            .await;

        match &outcome {
            Ok(result) if result.is_success() => {
                debug!(
                    tool = %call.tool_name,
                    "Tool call {} succeeded in {}ms",
                    call.call_id,
                    result.metadata.duration_ms.unwrap_or(0)
                );
                span.finish(
                    SpanStatus::Ok,
                    json!({ "duration_ms": result.metadata.duration_ms }),
                );
            }
            Ok(result) => {
                let message = result.error().map(|e| e.to_string()).unwrap_or_default();
                warn!(tool = %call.tool_name, "Tool call {} failed: {}", call.call_id, message);
                span.finish(SpanStatus::Error(message), Value::Null);
            }
            Err(e) => {
                warn!(tool = %call.tool_name, "Tool output rejected: {}", e);
                span.finish(SpanStatus::error(e.to_string()), Value::Null);
            }
        }
        outcome
    }
}

/// Give every request without an id the id `call_<cycle>_<index>`.
fn assign_call_ids(calls: Vec<ToolCallRequest>, cycle: usize) -> Vec<ToolCallRequest> {
    calls
        .into_iter()
        .enumerate()
        .map(|(index, call)| {
            if call.has_call_id() {
                call
            } else {
                call.with_call_id(format!("call_{}_{}", cycle, index))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::config::ExecutionParams;
    use crate::ports::model_gateway::ModelGateway;
    use crate::ports::observability::{ObservabilitySink, SpanEnd, SpanStart};
    use crate::ports::tool_executor::ToolExecutorPort;
    use async_trait::async_trait;
    use bridge_domain::{FieldSchema, FieldType, Schema, ToolDescriptor, ToolError, ToolErrorKind};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // ==================== Test Mocks ====================

    struct MockModel {
        replies: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
        requests: Mutex<Vec<Conversation>>,
    }

    impl MockModel {
        fn new(replies: Vec<ModelReply>) -> Self {
            Self::with_results(replies.into_iter().map(Ok).collect())
        }

        fn with_results(replies: Vec<Result<ModelReply, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(replies)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, index: usize) -> Conversation {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ModelGateway for MockModel {
        fn model_id(&self) -> &str {
            "mock-model"
        }

        async fn send(&self, request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
            self.requests.lock().unwrap().push(request.history.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more replies".to_string())))
        }
    }

    /// Requests the poem tool on every call.
    #[derive(Default)]
    struct AlwaysToolModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelGateway for AlwaysToolModel {
        fn model_id(&self) -> &str {
            "always-tool"
        }

        async fn send(&self, _request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ModelReply::tool_call(
                ToolCallRequest::new("poem").with_arg("line_count", 1),
            ))
        }
    }

    /// Never answers.
    struct PendingModel;

    #[async_trait]
    impl ModelGateway for PendingModel {
        fn model_id(&self) -> &str {
            "pending"
        }

        async fn send(&self, _request: ModelRequest<'_>) -> Result<ModelReply, GatewayError> {
            std::future::pending().await
        }
    }

    struct MockToolExecutor {
        descriptors: Vec<ToolDescriptor>,
        executed: AtomicUsize,
    }

    impl MockToolExecutor {
        fn new() -> Self {
            let string_field = |name: &str| {
                Schema::new().with_field(name, FieldSchema::new(FieldType::String, true))
            };
            Self {
                descriptors: vec![
                    ToolDescriptor::new(
                        "poem",
                        "Write a poem",
                        Schema::new().with_field(
                            "line_count",
                            FieldSchema::new(FieldType::Integer, true),
                        ),
                        string_field("poem"),
                    ),
                    ToolDescriptor::new(
                        "attack",
                        "Attack a target",
                        string_field("target"),
                        string_field("result"),
                    ),
                    ToolDescriptor::new(
                        "move",
                        "Move",
                        string_field("direction"),
                        string_field("position"),
                    ),
                ],
                executed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ToolExecutorPort for MockToolExecutor {
        fn descriptors(&self) -> &[ToolDescriptor] {
            &self.descriptors
        }

        async fn execute(
            &self,
            request: &ToolCallRequest,
            _ctx: &CallContext,
        ) -> Result<ToolCallResult, OutputEncodeError> {
            self.executed.fetch_add(1, Ordering::SeqCst);
            let (id, name) = (request.call_id.clone(), request.tool_name.clone());
            let result = match name.as_str() {
                "poem" => match request.get_i64("line_count") {
                    Some(n) => ToolCallResult::success(
                        id,
                        name,
                        json!({ "poem": "a line of poem\n".repeat(n as usize) }),
                    ),
                    None => ToolCallResult::failure(
                        id,
                        name,
                        ToolError::argument_decode("missing required field '$.line_count'"),
                    ),
                },
                "attack" => {
                    let target = request.get_string("target").unwrap_or_default();
                    let output = json!({ "result": format!("hit {}", target) });
                    ToolCallResult::success(id, name, output)
                }
                "move" => {
                    let direction = request.get_string("direction").unwrap_or_default();
                    ToolCallResult::success(id, name, json!({ "position": direction }))
                }
                "explode" => return Err(OutputEncodeError::new("explode", "missing field")),
                "stall" => return std::future::pending().await,
                "flaky" => ToolCallResult::failure(id, name, ToolError::handler("boom")),
                _ => ToolCallResult::failure(id, name.clone(), ToolError::unknown_tool(name)),
            };
            Ok(result)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        starts: Mutex<Vec<(SpanKind, Option<u64>)>>,
        ends: Mutex<Vec<(SpanKind, bool)>>,
    }

    impl ObservabilitySink for RecordingSink {
        fn span_start(&self, span: &SpanStart) {
            self.starts.lock().unwrap().push((span.kind, span.parent_id));
        }

        fn span_end(&self, span: &SpanEnd) {
            self.ends.lock().unwrap().push((span.kind, span.status.is_ok()));
        }
    }

    fn build_agent(
        model: Arc<dyn ModelGateway>,
        tools: Arc<MockToolExecutor>,
        params: ExecutionParams,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Agent {
        let config = AgentConfig::builder("poet_agent")
            .instruction("When asked to write a poem, you MUST use the tool.")
            .model(model)
            .tools(tools)
            .observability(sink)
            .params(params)
            .build()
            .unwrap();
        Agent::new(config)
    }

    fn agent_with(model: Arc<dyn ModelGateway>, params: ExecutionParams) -> Agent {
        build_agent(
            model,
            Arc::new(MockToolExecutor::new()),
            params,
            Arc::new(RecordingSink::default()),
        )
    }

    fn agent(model: Arc<dyn ModelGateway>) -> Agent {
        agent_with(model, ExecutionParams::default())
    }

    // ==================== Termination ====================

    #[tokio::test]
    async fn test_text_reply_ends_after_one_call() {
        let model = Arc::new(MockModel::new(vec![ModelReply::text("hello there")]));
        let tools = Arc::new(MockToolExecutor::new());
        let agent = build_agent(
            model.clone(),
            tools.clone(),
            ExecutionParams::default(),
            Arc::new(RecordingSink::default()),
        );

        let response = agent.respond(&Conversation::new(), "hi").await.unwrap();

        assert_eq!(response.answer, "hello there");
        assert_eq!(model.call_count(), 1);
        assert_eq!(tools.executed.load(Ordering::SeqCst), 0);
        assert_eq!(response.history.len(), 2);
        assert_eq!(response.history.tool_result_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_tool_calls_is_empty_answer() {
        let model = Arc::new(MockModel::new(vec![ModelReply::ToolCalls(vec![])]));
        let agent = agent(model.clone());

        let response = agent.respond(&Conversation::new(), "hi").await.unwrap();

        assert_eq!(response.answer, "");
        assert_eq!(model.call_count(), 1);
        assert_eq!(
            response.history.last(),
            Some(&ConversationTurn::ModelText(String::new()))
        );
    }

    #[tokio::test]
    async fn test_loop_bound_is_exact() {
        for max_turns in [1, 3, 10] {
            let model = Arc::new(AlwaysToolModel::default());
            let agent = agent_with(
                model.clone(),
                ExecutionParams::default().with_max_turns(max_turns),
            );

            let err = agent.respond(&Conversation::new(), "go").await.unwrap_err();

            assert!(
                matches!(err, RespondError::MaxTurnsExceeded { max_turns: m } if m == max_turns)
            );
            assert_eq!(model.calls.load(Ordering::SeqCst), max_turns);
        }
    }

    // ==================== Scenarios ====================

    #[tokio::test]
    async fn test_poem_tool_round_trip() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::tool_call(ToolCallRequest::new("poem").with_arg("line_count", 3)),
            ModelReply::text("Here is your poem."),
        ]));
        let agent = agent(model.clone());

        let response = agent
            .respond(&Conversation::new(), "write a poem")
            .await
            .unwrap();

        assert_eq!(response.answer, "Here is your poem.");
        assert_eq!(response.history.len(), 4);

        let turns = response.history.turns();
        assert_eq!(turns[0], ConversationTurn::user("write a poem"));
        assert_eq!(turns[1].as_tool_request().unwrap().call_id, "call_1_0");
        let result = turns[2].as_tool_result().unwrap();
        let poem = result.output().unwrap()["poem"].as_str().unwrap();
        assert_eq!(poem.lines().count(), 3);
        assert!(poem.lines().all(|l| l == "a line of poem"));
        assert_eq!(turns[3], ConversationTurn::model_text("Here is your poem."));

        // The second model call saw the tool result.
        assert_eq!(model.request(1).len(), 3);
        assert_eq!(model.request(1).last(), Some(&turns[2]));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::tool_call(ToolCallRequest::new("fly")),
            ModelReply::text("I cannot fly."),
        ]));
        let agent = agent(model.clone());

        let response = agent.respond(&Conversation::new(), "fly away").await.unwrap();

        assert_eq!(response.answer, "I cannot fly.");
        let second = model.request(1);
        let result = second.last().and_then(|t| t.as_tool_result()).unwrap();
        assert_eq!(result.error().map(|e| e.kind), Some(ToolErrorKind::UnknownTool));
    }

    #[tokio::test]
    async fn test_parallel_calls_complete_before_next_model_call() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::ToolCalls(vec![
                ToolCallRequest::new("attack").with_arg("target", "goblin"),
                ToolCallRequest::new("move").with_arg("direction", "north"),
            ]),
            ModelReply::text("The goblin is defeated."),
        ]));
        let tools = Arc::new(MockToolExecutor::new());
        let agent = build_agent(
            model.clone(),
            tools.clone(),
            ExecutionParams::default(),
            Arc::new(RecordingSink::default()),
        );

        let response = agent.respond(&Conversation::new(), "fight").await.unwrap();

        assert_eq!(tools.executed.load(Ordering::SeqCst), 2);
        let second = model.request(1);
        let results: Vec<&ToolCallResult> =
            second.iter().filter_map(|t| t.as_tool_result()).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].output().unwrap(), &json!({ "result": "hit goblin" }));
        assert_eq!(results[1].output().unwrap(), &json!({ "position": "north" }));
        assert_eq!(results[0].call_id, "call_1_0");
        assert_eq!(results[1].call_id, "call_1_1");
        assert_eq!(response.history.len(), 6);
    }

    // ==================== Errors ====================

    #[tokio::test]
    async fn test_handler_error_is_recoverable() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::tool_call(ToolCallRequest::new("flaky")),
            ModelReply::text("That failed."),
        ]));
        let agent = agent(model);

        let response = agent.respond(&Conversation::new(), "try").await.unwrap();

        let result = response.history.turns()[2].as_tool_result().unwrap();
        assert_eq!(result.error().map(|e| e.kind), Some(ToolErrorKind::Handler));
        assert_eq!(response.answer, "That failed.");
    }

    #[tokio::test]
    async fn test_output_encode_error_is_fatal() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::tool_call(ToolCallRequest::new("explode")),
            ModelReply::text("unreachable"),
        ]));
        let agent = agent(model.clone());

        let err = agent.respond(&Conversation::new(), "boom").await.unwrap_err();

        assert!(matches!(err, RespondError::OutputEncode(_)));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gateway_error_is_model_unavailable() {
        let model = Arc::new(MockModel::with_results(vec![Err(GatewayError::Timeout)]));
        let agent = agent(model);
        let history = Conversation::new();

        let err = agent.respond(&history, "hi").await.unwrap_err();

        assert!(matches!(err, RespondError::ModelUnavailable(GatewayError::Timeout)));
        assert!(!err.is_cancelled());
        assert!(history.is_empty());
    }

    // ==================== Call ids ====================

    #[test]
    fn test_assign_call_ids_keeps_existing() {
        let calls = vec![
            ToolCallRequest::new("attack").with_call_id("native-7"),
            ToolCallRequest::new("move"),
        ];

        let calls = assign_call_ids(calls, 2);

        assert_eq!(calls[0].call_id, "native-7");
        assert_eq!(calls[1].call_id, "call_2_1");
    }

    // ==================== Cancellation ====================

    #[tokio::test]
    async fn test_cancelled_before_model_call() {
        let model = Arc::new(MockModel::new(vec![ModelReply::text("never")]));
        let agent = agent(model.clone());
        let token = CancellationToken::new();
        token.cancel();

        let err = agent
            .respond_with_cancellation(&Conversation::new(), "hi", token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_while_waiting_for_model() {
        let agent = agent(Arc::new(PendingModel));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = agent
            .respond_with_cancellation(&Conversation::new(), "hi", token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_while_tools_run() {
        let model = Arc::new(MockModel::new(vec![
            ModelReply::ToolCalls(vec![
                ToolCallRequest::new("poem").with_arg("line_count", 1),
                ToolCallRequest::new("stall"),
            ]),
            ModelReply::text("never"),
        ]));
        let tools = Arc::new(MockToolExecutor::new());
        let sink = Arc::new(RecordingSink::default());
        let agent = build_agent(
            model.clone(),
            tools.clone(),
            ExecutionParams::default(),
            sink.clone(),
        );
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = agent
            .respond_with_cancellation(&Conversation::new(), "stall", token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(model.call_count(), 1);
        assert_eq!(tools.executed.load(Ordering::SeqCst), 2);

        let ends = sink.ends.lock().unwrap();
        let tool_ends: Vec<bool> = ends
            .iter()
            .filter(|(kind, _)| *kind == SpanKind::ToolCall)
            .map(|(_, ok)| *ok)
            .collect();
        assert_eq!(tool_ends.len(), 2);
        assert!(tool_ends.contains(&true));
        assert!(tool_ends.contains(&false));
        assert_eq!(ends.last(), Some(&(SpanKind::Respond, false)));
    }

    // ==================== Observability ====================

    #[tokio::test]
    async fn test_spans_are_nested_and_closed() {
        let sink = Arc::new(RecordingSink::default());
        let model = Arc::new(MockModel::new(vec![
            ModelReply::tool_call(ToolCallRequest::new("poem").with_arg("line_count", 1)),
            ModelReply::text("done"),
        ]));
        let config = AgentConfig::builder("poet_agent")
            .model(model)
            .tools(Arc::new(MockToolExecutor::new()))
            .observability(sink.clone())
            .build()
            .unwrap();

        Agent::new(config)
            .respond(&Conversation::new(), "poem please")
            .await
            .unwrap();

        let starts = sink.starts.lock().unwrap();
        let kinds: Vec<SpanKind> = starts.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                SpanKind::Respond,
                SpanKind::ModelCall,
                SpanKind::ToolCall,
                SpanKind::ModelCall
            ]
        );
        assert_eq!(starts[0].1, None);
        assert!(starts[1..].iter().all(|(_, parent)| *parent == Some(1)));

        let ends = sink.ends.lock().unwrap();
        assert_eq!(ends.len(), 4);
        assert!(ends.iter().all(|(_, ok)| *ok));
        assert_eq!(ends.last().map(|(k, _)| *k), Some(SpanKind::Respond));
    }
}
