//! Agent configuration and the public `respond` entry point.
//!
//! An [`AgentConfig`] is built once and shared by every response. It holds the
//! model gateway, the tool executor and the observability sink explicitly; the
//! agent has no global state of its own.
//!
//! ```text
//! AgentConfig::builder("poet_agent")
//!     .instruction("...")
//!     .model(gateway)
//!     .tools(registry)
//!     .build()?          ──▶ Agent::new(config)
//!                              │
//!                              ├─ respond(&history, "write a poem")
//!                              └─ respond(&history, "another one")   (concurrently)
//! ```

use crate::config::ExecutionParams;
use crate::ports::model_gateway::ModelGateway;
use crate::ports::observability::{NoObservability, ObservabilitySink};
use crate::ports::tool_executor::{NoTools, ToolExecutorPort};
use crate::use_cases::dispatch::{DispatchLoop, RespondError};
use bridge_domain::{Conversation, DomainError};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio_util::sync::CancellationToken;

/// Immutable configuration of an agent.
pub struct AgentConfig {
    name: String,
    description: String,
    instruction: String,
    model: Arc<dyn ModelGateway>,
    tools: Arc<dyn ToolExecutorPort>,
    observability: Arc<dyn ObservabilitySink>,
    params: ExecutionParams,
}

impl AgentConfig {
    pub fn builder(name: impl Into<String>) -> AgentConfigBuilder {
        AgentConfigBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &dyn ModelGateway {
        self.model.as_ref()
    }

    pub fn tools(&self) -> &dyn ToolExecutorPort {
        self.tools.as_ref()
    }

    pub fn observability(&self) -> &dyn ObservabilitySink {
        self.observability.as_ref()
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("model", &self.model.model_id())
            .field("tools", &self.tools.available_tools())
            .field("params", &self.params)
            .finish()
    }
}

/// Builder for [`AgentConfig`].
///
/// `model` is mandatory. Tools default to none and observability to a no-op
/// sink.
pub struct AgentConfigBuilder {
    name: String,
    description: String,
    instruction: String,
    model: Option<Arc<dyn ModelGateway>>,
    tools: Option<Arc<dyn ToolExecutorPort>>,
    observability: Option<Arc<dyn ObservabilitySink>>,
    params: ExecutionParams,
}

impl AgentConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            model: None,
            tools: None,
            observability: None,
            params: ExecutionParams::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelGateway>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tools(mut self, tools: Arc<dyn ToolExecutorPort>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn observability(mut self, sink: Arc<dyn ObservabilitySink>) -> Self {
        self.observability = Some(sink);
        self
    }

    pub fn params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn build(self) -> Result<AgentConfig, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidAgentConfig(
                "agent name must not be empty".to_string(),
            ));
        }
        if self.params.max_turns == 0 {
            return Err(DomainError::InvalidAgentConfig(
                "max_turns must be at least 1".to_string(),
            ));
        }
        let model = self.model.ok_or_else(|| {
            DomainError::InvalidAgentConfig(format!("agent '{}' has no model", self.name))
        })?;

        Ok(AgentConfig {
            name: self.name,
            description: self.description,
            instruction: self.instruction,
            model,
            tools: self.tools.unwrap_or_else(|| Arc::new(NoTools)),
            observability: self.observability.unwrap_or_else(|| Arc::new(NoObservability)),
            params: self.params,
        })
    }
}

/// Result of a successful `respond`.
#[derive(Debug, Clone)]
pub struct Response {
    /// The caller's history extended with every turn of this response
    pub history: Conversation,
    /// Final text answer of the model
    pub answer: String,
}

/// A configured agent.
///
/// Cheap to clone: clones share the same configuration. Any number of
/// `respond` calls may run concurrently on the same agent.
#[derive(Clone)]
pub struct Agent {
    config: Arc<AgentConfig>,
    span_ids: Arc<AtomicU64>,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
            span_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Answer one user input, running any tools the model requests.
    ///
    /// `history` is not modified; the extended conversation is returned in
    /// [`Response::history`]. Dropping the returned future cancels the
    /// response at its next suspension point.
    pub async fn respond(
        &self,
        history: &Conversation,
        input: impl Into<String>,
    ) -> Result<Response, RespondError> {
        self.respond_with_cancellation(history, input, CancellationToken::new())
            .await
    }

    /// Like [`respond`](Self::respond), but also stops with
    /// [`RespondError::Cancelled`] once `token` is cancelled.
    pub async fn respond_with_cancellation(
        &self,
        history: &Conversation,
        input: impl Into<String>,
        token: CancellationToken,
    ) -> Result<Response, RespondError> {
        DispatchLoop::new(&self.config, &self.span_ids, token)
            .run(history, input.into())
            .await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent").field("config", &self.config).finish()
    }
}
