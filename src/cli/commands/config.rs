//! Configuration inspection commands.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::LecternError;

/// Show or locate the configuration.
pub fn run_config(action: &ConfigAction, settings: Settings) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&settings)
                .map_err(|e| LecternError::Config(e.to_string()))?;
            println!("{}", content);
        }
        ConfigAction::Path => {
            Output::kv(
                "Config path",
                &Settings::default_config_path().display().to_string(),
            );
        }
    }

    Ok(())
}
