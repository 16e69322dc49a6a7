//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the final answer text
    Text,
    /// JSON object with the answer and the full conversation history
    Json,
}

/// CLI arguments for agent-bridge
#[derive(Parser, Debug)]
#[command(name = "agent-bridge")]
#[command(author, version, about = "Run an agent that answers with the help of typed tools")]
#[command(long_about = r#"
agent-bridge runs a single agent: an instruction, a model and a set of tools.
Each input is answered by a dispatch loop that asks the model for a reply,
runs the tools it requests and feeds their results back until the model
answers in text.

Without an INPUT argument, every non-empty line of stdin is answered in turn,
sharing one conversation history.

The model is a scripted replay of recorded replies (see --script).

Configuration files are loaded from (in priority order):
1. AGENT_BRIDGE_* environment variables (e.g. AGENT_BRIDGE_AGENT__MAX_TURNS=3)
2. --config <path>     Explicit config file
3. ./agent-bridge.toml Project-level config
4. ~/.config/agent-bridge/config.toml   Global config

Example:
  agent-bridge --script replies.json "Write a poem of 3 lines"
  agent-bridge --list-tools
  echo "write a poem" | agent-bridge --script replies.json -o json
"#)]
pub struct Cli {
    /// Input to answer (reads stdin line by line if omitted)
    pub input: Option<String>,

    /// JSON file of scripted model replies
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the banner and per-answer headers
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Print the tool declarations sent to the model, then exit
    #[arg(long)]
    pub list_tools: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_single_input() {
        let cli = Cli::parse_from(["agent-bridge", "--script", "r.json", "-vv", "write a poem"]);
        assert_eq!(cli.input.as_deref(), Some("write a poem"));
        assert_eq!(cli.script, Some(PathBuf::from("r.json")));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "agent-bridge",
            "-o",
            "json",
            "-q",
            "--no-config",
            "--list-tools",
        ]);
        assert!(cli.input.is_none());
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(cli.no_config);
        assert!(cli.list_tools);
    }
}
