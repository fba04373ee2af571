//! CLI command definitions.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flags shared by every command. They override the config file and
/// `SEALCACHE_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bucket holding the encrypted objects
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// AWS region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Encryption context attribute (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE", value_parser = parse_attribute, global = true)]
    pub context: Vec<(String, String)>,

    /// Mirror telemetry events to stderr as JSON lines
    #[arg(long, global = true)]
    pub stderr_telemetry: bool,

    /// Export spans to an OTLP collector
    #[arg(long, value_name = "URL", global = true)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one key through the cache
    Get {
        /// Object key
        key: String,

        /// How to print the plaintext
        #[arg(short, long, value_enum, default_value = "raw")]
        format: OutputFormat,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the layered configuration with credentials masked
    Show,

    /// Check the layered configuration
    Validate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Raw,
    Base64,
    Json,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if name.trim().is_empty() {
        return Err(format!("empty attribute name in `{raw}`"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}
