//! daily-update
//!
//! Rolls TaskPaper task lists forward to today: promotes scheduled items,
//! merges recurring templates, archives finished work and replays missed days.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use taskpaper_rollover::cli::agenda::AgendaArgs;
use taskpaper_rollover::cli::update::UpdateArgs;
use taskpaper_rollover::cli::{Cli, Command};
use taskpaper_rollover::config::{Config, ConfigLoader};
use taskpaper_rollover::format::format_report;
use taskpaper_rollover::logging::{LogTarget, init_logging};
use taskpaper_rollover::outline::Outline;
use taskpaper_rollover::update::{
    Clock, FileReport, UpdateSettings, load_outline, recurring_templates, run_batch,
};
use tracing::debug;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = match cli.config {
        Some(ref path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::load()?,
    };
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = %path.display(), "Using config");
    }

    match cli.command {
        Some(Command::Agenda(args)) => run_agenda(&args),
        None => run_update(loader.into_config(), &cli.update),
    }
}

fn run_agenda(args: &AgendaArgs) -> Result<ExitCode> {
    let outline = load_outline(&args.file)?;
    print!("{}", outline.render_filtered(|node| node.has_tag(&args.tag)));
    Ok(ExitCode::SUCCESS)
}

fn run_update(mut config: Config, args: &UpdateArgs) -> Result<ExitCode> {
    if args.files.is_empty() {
        anyhow::bail!("no TaskPaper files given");
    }

    args.apply(&mut config);
    let settings = UpdateSettings::from_config(&config, args.date);

    let templates = recurring_templates(config.recurring.as_deref());

    let reports = run_batch(&args.files, &settings, templates.as_ref(), &Clock::local());

    for report in &reports {
        print_outcome(report, settings.simulate, args.show.as_deref());
    }
    if let Some(format) = args.format {
        print!("{}", format_report(&reports, format));
    }

    let failed = reports.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        eprintln!("{} of {} file(s) failed", failed, reports.len());
        for report in reports.iter() {
            if let Err(ref e) = report.result {
                eprintln!("  {}: {}", report.path.display(), e);
            }
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print what the user asked to see for one successful file.
fn print_outcome(report: &FileReport, simulate: bool, show: Option<&str>) {
    let Ok(ref outcome) = report.result else {
        return;
    };
    if simulate {
        println!("==> {} <==", outcome.path.display());
        print!("{}", outcome.document);
        println!("==> {} <==", outcome.archive_path.display());
        print!("{}", outcome.archive);
    }
    if let Some(tag) = show {
        let view = Outline::parse(&outcome.document).render_filtered(|node| node.has_tag(tag));
        if !view.is_empty() {
            println!("{}:", outcome.path.display());
            print!("{view}");
        }
    }
}
