//! Command handlers -- one module per subcommand

pub mod config;
pub mod scan;

use std::path::Path;

use pkgscan_core::config::PkgscanConfig;

use crate::error::CliError;

/// Load the effective configuration.
///
/// A missing file is not an error: defaults are used, with environment
/// overrides applied on top. Any other load failure is returned.
pub async fn load_config(config_path: &Path) -> Result<PkgscanConfig, CliError> {
    if tokio::fs::try_exists(config_path).await? {
        return Ok(PkgscanConfig::load(config_path).await?);
    }

    tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
    let mut config = PkgscanConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
