//! Initialize configuration and data directories.

use crate::cli::Output;
use crate::config::Settings;

/// Write the default configuration and create the data directory.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    let config_path = Settings::default_config_path();

    if config_path.exists() {
        Output::info(&format!("Configuration already exists at {:?}", config_path));
    } else {
        settings.save()?;
        Output::success(&format!("Wrote default configuration to {:?}", config_path));
    }

    std::fs::create_dir_all(settings.data_dir())?;
    Output::success(&format!("Data directory ready at {:?}", settings.data_dir()));

    Output::info("Set OPENAI_API_KEY in your environment before processing lectures.");

    Ok(())
}
