//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use anyhow::{bail, Result};
use lexrag_core::Config;
use std::path::Path;

pub fn run(args: ConfigArgs, path: &Path, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_from(path)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Cli => print!("{}", serde_yaml::to_string(&config)?),
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
