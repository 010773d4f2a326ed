use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Meeting recording orchestrator", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Merge the worker transcripts in a directory into one combined file
    Merge(MergeCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct MergeCliArgs {
    /// Directory containing the transcript artifacts
    /// (defaults to the sessions directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}
