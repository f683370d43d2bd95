//! CLI module for steel-toes - command-line interface and subcommands.
//!
//! The main use of the CLI is cleaning up branched data once work on a
//! branch is done.

pub mod commands;

pub use commands::Cli;
