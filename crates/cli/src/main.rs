mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use skiff_athena::catalog::{self, sorted_for_display};
use skiff_athena::{aws, AthenaClient, AthenaConfig, ExecuteOptions};

use crate::cli::{CliArgs, ClientCommand, Command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = config::resolve(&args);

    match args.command {
        // Listing databases must work before a database is chosen, so it
        // skips the existence check the client performs.
        Command::Databases => {
            let services = aws::load_services(&config)
                .await
                .context("failed to initialise AWS clients")?;
            let databases = catalog::list_databases(services.catalog.as_ref()).await?;
            output::print_lines(&sorted_for_display(&databases));
            Ok(())
        }
        Command::Client(command) => {
            let client = connect(config).await?;
            run(&client, command).await
        }
    }
}

async fn connect(config: AthenaConfig) -> Result<AthenaClient> {
    let database = config.database.clone();
    AthenaClient::connect(config)
        .await
        .with_context(|| format!("failed to connect to database '{database}'"))
}

async fn run(client: &AthenaClient, command: ClientCommand) -> Result<()> {
    match command {
        ClientCommand::Tables => {
            let tables = client.list_tables().await?;
            output::print_lines(&sorted_for_display(&tables));
        }
        ClientCommand::Columns { table } => {
            let columns = client
                .list_columns(&table)
                .await
                .with_context(|| format!("failed to describe table '{table}'"))?;
            output::print_lines(&columns);
        }
        ClientCommand::Query {
            sql,
            output: location,
            keep,
            run_async,
            json,
        } => {
            let mut opts = ExecuteOptions::default().keep_staged(keep);
            if let Some(location) = location {
                opts = opts.output_location(location);
            }

            if run_async {
                let execution_id = client.execute_async(&sql, opts).await?;
                println!("{execution_id}");
                return Ok(());
            }

            let (table, execution_id) = client.execute(&sql, opts).await?;
            info!(execution_id = %execution_id, rows = table.row_count(), "Query finished");
            output::print_table(&table, json)?;
        }
        ClientCommand::Status { execution_id } => {
            println!("{}", client.status(&execution_id).await?);
        }
        ClientCommand::Fetch {
            execution_id,
            keep,
            json,
        } => {
            let table = client.fetch(&execution_id, keep).await?;
            output::print_table(&table, json)?;
        }
        ClientCommand::Error { execution_id } => {
            println!("{}", client.failure_reason(&execution_id).await?);
        }
        ClientCommand::Cancel { execution_id } => {
            client.cancel(&execution_id).await?;
            println!("{execution_id}");
        }
        ClientCommand::Running => {
            output::print_lines(&client.list_running().await?);
        }
        ClientCommand::StopAll => {
            let stopped = client.stop_all_running().await?;
            output::print_lines(&stopped);
            eprintln!("Stopped {} execution(s)", stopped.len());
        }
    }
    Ok(())
}
