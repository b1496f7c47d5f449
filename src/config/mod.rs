//! Layered configuration.
//!
//! Settings come from four tiers, later tiers overriding earlier ones field by
//! field:
//! 1. **Defaults** - [`Config::default`]
//! 2. **Project** - `$CWD/daily-update/config.yaml`
//! 3. **User** - `~/.daily-update/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `DAILY_UPDATE_CONFIG_PATH` - Explicit config file (skips the file tiers)
//! - `DAILY_UPDATE_PROJECT_DIR` - Project config dir (default: `./daily-update`)
//! - `DAILY_UPDATE_USER_DIR` - User config dir (default: `~/.daily-update`)
//! - `DAILY_UPDATE_RECURRING` - Recurring template file
//! - `DAILY_UPDATE_CATCH_UP` - `1`/`true` to replay missed days
//! - `DAILY_UPDATE_CARRY_TOMORROW` - `1`/`true` to resolve the next weekday early

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{merge_layers, overlay};
pub use types::*;
