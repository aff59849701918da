use clap::{Parser, Subcommand};

/// Run SQL against AWS Athena and manage query executions.
///
/// Results are staged in S3 by Athena, downloaded, printed, and removed
/// unless kept.
#[derive(Parser, Debug)]
#[command(name = "skiff", version, about)]
pub struct CliArgs {
    /// Athena database (overrides ATHENA_DATABASE)
    #[arg(long, short = 'd', global = true)]
    pub database: Option<String>,

    /// AWS region (overrides ATHENA_REGION / AWS_REGION)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Config profile prefix, e.g. PROD reads PROD_ATHENA_* first
    #[arg(long, env = "SKIFF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Athena workgroup (overrides ATHENA_WORKGROUP)
    #[arg(long, global = true)]
    pub workgroup: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List databases in the catalog
    Databases,

    #[command(flatten)]
    Client(ClientCommand),
}

/// Subcommands that run against a verified database.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// List tables in the database
    Tables,

    /// List columns of a table
    Columns {
        table: String,
    },

    /// Run a query
    Query {
        /// SQL text
        sql: String,

        /// S3 location to stage results in (results are then kept)
        #[arg(long)]
        output: Option<String>,

        /// Keep the staged result files in S3
        #[arg(long)]
        keep: bool,

        /// Submit and print the execution ID without waiting
        #[arg(long = "async")]
        run_async: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the state of an execution
    Status {
        execution_id: String,
    },

    /// Download the result of a finished execution
    Fetch {
        execution_id: String,

        /// Keep the staged result files in S3
        #[arg(long)]
        keep: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show why an execution failed
    Error {
        execution_id: String,
    },

    /// Cancel an execution
    Cancel {
        execution_id: String,
    },

    /// List running executions
    Running,

    /// Cancel every running execution
    StopAll,
}
