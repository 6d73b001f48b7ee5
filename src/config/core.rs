use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::Path;

use super::ScatterConfig;
use crate::error::{Result, ScatterError};

/// Repository configuration file picked up from the working directory
pub const CONFIG_FILE_NAME: &str = "sv-scatter.toml";

const ENV_PREFIX: &str = "SV_SCATTER_";

impl ScatterConfig {
    /// Load the merged configuration.
    ///
    /// Priority, lowest first: built-in defaults, the TOML file (`custom_config`
    /// or `sv-scatter.toml`), then `SV_SCATTER_*` environment variables with
    /// `__` separating sections (`SV_SCATTER_PARALLEL__MAX_THREADS=4`).
    pub fn load(custom_config: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_config
            && !path.is_file()
        {
            return Err(ScatterError::InvalidConfig(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let config: ScatterConfig = figment(custom_config, ENV_PREFIX)
            .extract()
            .map_err(|e| ScatterError::InvalidConfig(e.to_string()))?;

        config.validate()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Render as TOML, the same shape `load` reads back
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ScatterError::InvalidConfig(e.to_string()))
    }
}

fn figment(custom_config: Option<&Path>, env_prefix: &str) -> Figment {
    let file = custom_config.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));

    Figment::new()
        .merge(Serialized::defaults(ScatterConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(env_prefix).split("__"))
}
