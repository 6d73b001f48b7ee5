use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use std::path::Path;

use crate::cli::Output;
use crate::config::{CONFIG_FILE_NAME, ScatterConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write the default configuration to sv-scatter.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Display the merged configuration (defaults, file, environment)
    Show {
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Toml)]
        format: ShowFormat,
    },
    /// Load and validate the configuration
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    Toml,
    Json,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    let load = || ScatterConfig::load(custom_config.map(Path::new)).context("Failed to load configuration");

    match args.command {
        ConfigCommand::Init { force } => {
            let path = Path::new(CONFIG_FILE_NAME);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", CONFIG_FILE_NAME);
            }
            let rendered = ScatterConfig::default().to_toml_string()?;
            std::fs::write(path, rendered).with_context(|| format!("Failed to write {CONFIG_FILE_NAME}"))?;
            output.success(&format!("Created {CONFIG_FILE_NAME} with default settings"));
        }
        ConfigCommand::Show { format } => {
            let config = load()?;
            match format {
                ShowFormat::Toml => print!("{}", config.to_toml_string()?),
                ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
        ConfigCommand::Validate => {
            let config = load()?;
            output.success("Configuration is valid");
            output.table_row("source_dir", &config.paths.source_dir.display().to_string());
            output.table_row("output_dir", &config.paths.output_dir.display().to_string());
            output.table_row("converter", &config.converter.program);
        }
    }

    Ok(())
}
