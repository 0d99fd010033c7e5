//! tablesync: provision Firebase users from AITable rows.
//!
//! # Usage
//!
//! ```text
//! tablesync serve [--port <port>]
//! tablesync run [--json]
//! ```
//!
//! Both commands read their configuration from the environment
//! (`AITABLE_API_URL`, `PATCH_URL`, `AITABLE_TOKEN`,
//! `FIREBASE_SERVICE_ACCOUNT_BASE64`, ...).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{run::RunArgs, serve::ServeArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tablesync",
    version,
    about = "Sync AITable rows into Firebase Auth users and Firestore profiles",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the `/sync` endpoint over HTTP.
    Serve(ServeArgs),

    /// Run one sync pass in the foreground and print the summary.
    Run(RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Run(args) => args.run(),
    }
}
