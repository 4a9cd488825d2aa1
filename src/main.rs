mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    handlecheck::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => app::check(args).await?,
        Commands::Filter(args) => app::filter(args)?,
        Commands::Config(args) => app::show_config(args)?,
    }

    Ok(())
}
