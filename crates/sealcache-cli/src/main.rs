//! sealcache CLI entrypoint.

use clap::Parser;
use std::process::ExitCode;

mod commands;
mod handlers;
mod settings;

use commands::{Commands, ConfigCommands, GlobalArgs};
use sealcache_trace::{init_tracer, shutdown_tracer};
use tracing::warn;

#[derive(Parser)]
#[command(name = "sealcache")]
#[command(author, version, about = "Read KMS-encrypted objects from S3 through a memoizing cache", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", console::style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let dotenv_error = settings::load_dotenv();
    let env = settings::EnvOverrides::from_env()?;
    init_tracer(&settings::tracing_config(&cli.global, &env))?;

    if let Some(err) = dotenv_error {
        warn!(error = %err, "Ignoring unreadable .env file");
    }
    let config = settings::load(&cli.global, env)?;

    let code = match cli.command {
        Commands::Get { key, format } => handlers::get(config, &key, format).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config).map(|()| ExitCode::SUCCESS),
            ConfigCommands::Validate => Ok(if handlers::validate_config(config) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }),
        },
    };

    shutdown_tracer();
    code
}
