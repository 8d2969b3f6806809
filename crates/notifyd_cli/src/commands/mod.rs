pub mod paths;
pub mod serve;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::app::AppContext;

pub use paths::PathsCommand;
pub use serve::ServeCommand;

#[async_trait]
pub trait CliCommand {
    async fn execute(&self, ctx: &AppContext) -> Result<()>;
}

#[derive(Parser, Debug, Clone)]
#[command(name = "notifyd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: RootCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RootCommand {
    Serve(ServeCommand),
    Paths(PathsCommand),
}

impl Cli {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            RootCommand::Serve(cmd) => cmd.execute(ctx).await,
            RootCommand::Paths(cmd) => cmd.execute(ctx).await,
        }
    }
}
