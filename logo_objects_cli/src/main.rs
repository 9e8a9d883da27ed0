mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logo_objects_api::{ApiClient, ApiClientConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "logo-objects")]
#[command(about = "Query a Logo Objects ERP over its REST API")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers and the credentials are accepted
    Ping,
    /// List records of a resource
    List(commands::list::ListArgs),
    /// Fetch one record by its internal reference
    Get(commands::get::GetArgs),
    /// Count records matching the filters
    Count(commands::count::CountArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("logo_objects_api=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let config = ApiClientConfig::from_env().context("Invalid LOGO_* configuration")?;
    let client = ApiClient::new(config)?;

    match &cli.command {
        Commands::Ping => commands::ping::run(&client, &format).await?,
        Commands::List(args) => commands::list::run(args, &client, &format).await?,
        Commands::Get(args) => commands::get::run(args, &client, &format).await?,
        Commands::Count(args) => commands::count::run(args, &client, &format).await?,
    }

    Ok(())
}
