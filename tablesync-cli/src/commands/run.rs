//! `tablesync run`: one pass from the terminal.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use tablesync_core::Settings;
use tablesync_job::{pipeline, SyncOutcome, SyncSummary};

/// Arguments for `tablesync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Print the same JSON body the `/sync` endpoint returns.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        tablesync_server::init_tracing();
        let settings = Settings::from_env().context("invalid environment configuration")?;
        let job = tablesync_remote::build_job(&settings).context("failed to initialize Firebase")?;

        if self.json {
            let reply = pipeline::run(&job);
            println!(
                "{}",
                serde_json::to_string_pretty(&reply.body).context("failed to render sync JSON")?
            );
            if !reply.ok {
                bail!("sync aborted");
            }
            return Ok(());
        }

        let outcome = job.run().context("sync aborted")?;
        print_outcome(&outcome);
        Ok(())
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::NoRecords => println!("{} {}", "·".bright_black(), outcome.message()),
        SyncOutcome::Completed(summary) => print_summary(summary),
    }
}

fn print_summary(summary: &SyncSummary) {
    let mark = if summary.failed == 0 {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!("{mark} {}", summary.message());
    println!("  {:<15} {}", "synced", summary.synced.to_string().green());
    println!("  {:<15} {}", "already synced", summary.already_synced);
    println!("  {:<15} {}", "incomplete", summary.incomplete);
    println!("  {:<15} {}", "failed", summary.failed.to_string().red());
    println!("  {:<15} {} ms", "duration", summary.duration_ms);

    for error in &summary.errors {
        println!("  {} {error}", "✗".red());
    }
}
