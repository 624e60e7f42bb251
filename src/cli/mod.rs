//! CLI module for reelr - command-line interface and subcommands.
//!
//! Provides the main entry point with the produce subcommand and global
//! config/verbose options.

pub mod commands;

pub use commands::Cli;
