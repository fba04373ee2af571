//! Command handlers.

use crate::commands::OutputFormat;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use console::style;
use sealcache::{CacheConfig, LookupContext};
use sealcache_trace::lookup_span;
use serde_json::json;
use std::io::Write;
use std::process::ExitCode;
use tracing::Instrument;

/// Exit status for a key confirmed absent.
pub const EXIT_ABSENT: u8 = 2;

/// Resolve one key and print it.
pub async fn get(config: CacheConfig, key: &str, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let cache = sealcache_aws::connect(config).await?;
    let span = lookup_span(key);
    let value = cache
        .lookup(key, &LookupContext::with_parent(span.clone()))
        .instrument(span)
        .await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&render(key, value.as_deref(), format))?;
    stdout.flush()?;

    if value.is_none() {
        if format != OutputFormat::Json {
            eprintln!("{} {} is absent", style("!").yellow(), style(key).bold());
        }
        return Ok(ExitCode::from(EXIT_ABSENT));
    }
    Ok(ExitCode::SUCCESS)
}

fn render(key: &str, value: Option<&[u8]>, format: OutputFormat) -> Vec<u8> {
    match (format, value) {
        (OutputFormat::Raw, Some(plaintext)) => plaintext.to_vec(),
        (OutputFormat::Base64, Some(plaintext)) => format!("{}\n", STANDARD.encode(plaintext)).into_bytes(),
        (OutputFormat::Raw | OutputFormat::Base64, None) => Vec::new(),
        (OutputFormat::Json, value) => {
            let body = json!({
                "key": key,
                "found": value.is_some(),
                "value": value.map(|plaintext| STANDARD.encode(plaintext)),
            });
            format!("{body}\n").into_bytes()
        }
    }
}

/// Print the layered configuration with secrets masked.
pub fn show_config(config: &CacheConfig) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&config.masked())?);
    Ok(())
}

/// Validate the layered configuration without contacting AWS.
pub fn validate_config(config: CacheConfig) -> bool {
    match config.validate() {
        Ok(settings) => {
            println!("{} Configuration is valid", style("✓").green());
            println!("  Bucket: {}", settings.bucket);
            println!("  Region: {}", settings.region);
            println!("  Context attributes: {}", settings.encryption_context.len());
            println!("  Seeded keys: {}", settings.initial_cache.len());
            true
        }
        Err(err) => {
            eprintln!("{} {}", style("✗").red(), err);
            false
        }
    }
}
