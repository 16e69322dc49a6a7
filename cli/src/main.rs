//! CLI entrypoint for agent-bridge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod tools;

use anyhow::{Context, Result, anyhow, bail};
use bridge_application::{
    Agent, AgentConfig, ObservabilitySink, RespondError, Response, ToolSchemaPort,
};
use bridge_domain::Conversation;
use bridge_infrastructure::{
    ConfigLoader, FileConfig, FunctionDeclarationConverter, JsonlSpanSink, ScriptedModel,
    ToolRegistry, TracingSpanSink,
};
use clap::Parser;
use commands::{Cli, OutputFormat};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    config.validate()?;

    // === Tools ===
    let registry = tools::build_registry()?;

    if cli.list_tools {
        let declarations = FunctionDeclarationConverter.all_declarations(registry.list());
        println!("{}", serde_json::to_string_pretty(&declarations)?);
        return Ok(());
    }

    // === Dependency Injection ===
    let agent = Agent::new(build_agent_config(&cli, &config, registry)?);

    info!(
        agent = agent.name(),
        model = agent.config().model().model_id(),
        "Starting agent-bridge"
    );

    if !cli.quiet {
        eprintln!(
            "Agent: {} (model: {}, tools: {})",
            agent.name(),
            agent.config().model().model_id(),
            agent.config().tools().available_tools().join(", ")
        );
    }

    // Ctrl-C cancels the response in flight
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    match cli.input.clone() {
        Some(input) => {
            let response = agent
                .respond_with_cancellation(&Conversation::new(), input, token)
                .await?;
            print_response(&response, cli.output)?;
        }
        None => run_stdin(&agent, &cli, token).await?,
    }

    Ok(())
}

fn build_agent_config(
    cli: &Cli,
    config: &FileConfig,
    registry: ToolRegistry,
) -> Result<AgentConfig> {
    let Some(script) = cli.script.as_ref().or(config.model.script.as_ref()) else {
        bail!("No model script given. Use --script <PATH> or set model.script in the config.");
    };
    let model = ScriptedModel::from_file(&config.model.id, script)
        .with_context(|| format!("Failed to load model script {}", script.display()))?;

    let sink: Arc<dyn ObservabilitySink> = match config.telemetry.trace_file.as_ref() {
        Some(path) => match JsonlSpanSink::new(path) {
            Some(sink) => Arc::new(sink),
            None => {
                warn!("Falling back to log output for spans");
                Arc::new(TracingSpanSink)
            }
        },
        None => Arc::new(TracingSpanSink),
    };

    let agent_config = AgentConfig::builder(&config.agent.name)
        .description(&config.agent.description)
        .instruction(&config.agent.instruction)
        .model(Arc::new(model))
        .tools(Arc::new(registry))
        .observability(sink)
        .params(config.agent.execution_params())
        .build()?;

    Ok(agent_config)
}

/// Answer every non-empty stdin line, threading the conversation history.
async fn run_stdin(agent: &Agent, cli: &Cli, token: CancellationToken) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = Conversation::new();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match agent
            .respond_with_cancellation(&history, input, token.clone())
            .await
        {
            Ok(response) => {
                print_response(&response, cli.output)?;
                history = response.history;
            }
            Err(RespondError::Cancelled) => {
                eprintln!("Cancelled.");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
    }

    Ok(())
}

fn print_response(response: &Response, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", response.answer),
        OutputFormat::Json => {
            let output = json!({
                "answer": response.answer,
                "history": response.history,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
