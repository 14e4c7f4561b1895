use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "view.timezone", "scheduler.debounce_ms")
        key: String,
        /// Config file to read instead of the default
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the effective configuration
    Show {
        /// Config file to read instead of the default
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key, config } => {
            let config = super::load_config(config.as_deref())?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Show { config, json } => {
            let config = super::load_config(config.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_toml_string()?);
            }
        }
    }
    Ok(())
}
