//! Agenda subcommand: a read-only view of tagged items.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the agenda subcommand
#[derive(Args, Debug)]
pub struct AgendaArgs {
    /// TaskPaper file to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Tag to show, with the projects that contain it
    #[arg(short, long, default_value = "today")]
    pub tag: String,
}
