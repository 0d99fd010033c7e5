//! `tablesync serve`: HTTP server in the foreground.

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for `tablesync serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen port; overrides `PORT`.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        tablesync_server::start_blocking(self.port).context("server exited with error")
    }
}
