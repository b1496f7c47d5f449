//! Arguments for the default update run.

use crate::config::Config;
use crate::dates::DayOverride;
use crate::format::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for updating documents
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// TaskPaper files to update; each gets a sibling archive file
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Recurring task templates (overrides config)
    #[arg(short, long, value_name = "FILE")]
    pub recurring: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD) or the latest such weekday
    #[arg(short, long, value_name = "DATE|WEEKDAY")]
    pub date: Option<DayOverride>,

    /// Print the results instead of overwriting the files
    #[arg(short, long)]
    pub simulate: bool,

    /// Also resolve tomorrow's weekday items, tagging them @tomorrow
    #[arg(short, long)]
    pub tomorrow: bool,

    /// Replay every day missed since the archive was last updated
    #[arg(short = 'u', long)]
    pub catch_up: bool,

    /// After updating, print the items carrying this tag
    #[arg(long, value_name = "TAG")]
    pub show: Option<String>,

    /// Print a summary of every file processed
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl UpdateArgs {
    /// Fold command-line overrides into the loaded configuration.
    ///
    /// Flags only ever switch features on; they cannot turn off a setting that
    /// the configuration enabled.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref recurring) = self.recurring {
            config.recurring = Some(recurring.clone());
        }
        config.simulate |= self.simulate;
        config.carry_tomorrow |= self.tomorrow;
        config.catch_up |= self.catch_up;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> UpdateArgs {
        UpdateArgs {
            files: vec![PathBuf::from("todo.taskpaper")],
            recurring: None,
            date: None,
            simulate: false,
            tomorrow: false,
            catch_up: false,
            show: None,
            format: None,
        }
    }

    #[test]
    fn apply_keeps_config_when_no_flags() {
        let mut config = Config {
            catch_up: true,
            recurring: Some(PathBuf::from("r.taskpaper")),
            ..Default::default()
        };
        args().apply(&mut config);
        assert!(config.catch_up);
        assert_eq!(config.recurring, Some(PathBuf::from("r.taskpaper")));
    }

    #[test]
    fn apply_flags_override() {
        let mut config = Config::default();
        let args = UpdateArgs {
            recurring: Some(PathBuf::from("other.taskpaper")),
            simulate: true,
            tomorrow: true,
            ..args()
        };
        args.apply(&mut config);
        assert!(config.simulate);
        assert!(config.carry_tomorrow);
        assert!(!config.catch_up);
        assert_eq!(config.recurring, Some(PathBuf::from("other.taskpaper")));
    }
}
