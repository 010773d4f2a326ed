mod args;
mod merge;

pub use args::{Cli, CliCommand, MergeCliArgs};
pub use merge::handle_merge_command;
