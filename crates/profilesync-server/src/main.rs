//! Main entry point for the profilesync operator command line.

use clap::Parser;
use profilesync_server::{
    Cli, Command, Configuration, execute,
    model::Result,
    startup::{self, AppContext},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let configuration = Configuration::new(&cli)?;

    let logging_guard = startup::init_logging(&configuration.logging_config())
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let output = match cli.command {
        Command::Migrate => {
            startup::run_migrations(&configuration).await?;
            json!({ "migrated": true })
        }
        command => {
            let ctx = AppContext::from_configuration(&configuration).await?;
            match execute(&ctx, command).await {
                Ok(output) => output,
                Err(e) => {
                    error!(error = %e, "Command failed");
                    print_json(&e.to_result())?;
                    drop(logging_guard);
                    std::process::exit(e.exit_code());
                }
            }
        }
    };

    print_json(&Result::success(output))
}
