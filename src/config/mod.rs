//! `tree-tokens.toml` loading for the command-line tool.

pub mod loader;
pub mod schema;

pub use loader::{discover, load_from_path, load_from_str, ConfigError, DEFAULT_CONFIG_FILE};
pub use schema::{Config, MarkerConfig, OutputConfig, ValidationError, ValidationIssue};
