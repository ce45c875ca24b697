//! Command implementations for the sroute CLI

pub mod check;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sroute_config::Config;

/// Config paths tried when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/sroute.toml", "sroute.toml"];

/// Load the config from `path`, or from the default locations
///
/// An explicit path must exist. Without one, the first default path that
/// exists is used, falling back to built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        let config = Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    for candidate in DEFAULT_CONFIG_PATHS {
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            tracing::info!(config = %candidate.display(), "using config file");
            let config = Config::from_file(&candidate)
                .with_context(|| format!("failed to load configuration from {}", candidate.display()))?;
            return Ok((config, Some(candidate)));
        }
    }

    tracing::info!("no config file found, using defaults (no routes)");
    Ok((Config::default(), None))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_explicit_missing_path_fails() {
        let err = load_config(Some(Path::new("/nonexistent/sroute.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_explicit_path_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"127.0.0.1:9201\"").unwrap();

        let (config, path) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9201");
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/sroute.toml");
        let (config, _) = load_config(Some(&path)).unwrap();
        assert_eq!(config.route_names(), vec!["cluster-a", "to-kafka"]);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"not an address\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("failed to load configuration"));
    }
}
