//! CLI definitions for daily-update
//!
//! This module defines the CLI structure using clap's derive macros.
//! Without a subcommand the given files are updated; `agenda` only prints.

pub mod agenda;
pub mod update;

use agenda::AgendaArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use update::UpdateArgs;

/// Roll TaskPaper task lists forward to today
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(flatten)]
    pub update: UpdateArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the items carrying a tag (default: today) without changing anything
    Agenda(AgendaArgs),
}
