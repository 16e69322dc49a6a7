//! Configuration file loading for agent-bridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_BRIDGE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./agent-bridge.toml`
//! 4. Global: `$XDG_CONFIG_HOME/agent-bridge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileModelConfig, FileTelemetryConfig,
};
pub use loader::ConfigLoader;
