//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - clean-branch: remove branched copies of datasets
//! - protected: list datasets currently redirected to a branch

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// steel-toes - protection against stepping on teammates' toes in a pipeline project
#[derive(Parser, Debug)]
#[command(name = "steel-toes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find branch datasets and remove them
    CleanBranch {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Git branch to clean files from (defaults to the current branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Display the files that would be deleted without deleting them
        #[arg(long)]
        dryrun: bool,
    },

    /// List datasets currently protected on the active branch
    Protected {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
