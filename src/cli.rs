use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "handlecheck")]
#[command(about = "Check which Minecraft usernames are still available", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up every valid name in a word list and append the available ones
    Check(CheckArgs),
    /// Print the names from a word list that pass validation
    Filter(FilterArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Word list, one candidate per line
    pub input: PathBuf,

    /// File that available names are appended to (overrides configuration)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to $HANDLECHECK_CONFIG or config/handlecheck.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct FilterArgs {
    /// Word list, one candidate per line
    pub input: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file (defaults to $HANDLECHECK_CONFIG or config/handlecheck.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
