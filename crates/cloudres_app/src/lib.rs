//! CloudRes app: the run orchestrator plus what the `cloudres` binary needs
//! around it (configuration, logging, terminal rendering).
pub mod config;
pub mod logging;
mod orchestrator;
pub mod render;

pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILENAME};
pub use orchestrator::RunOrchestrator;
