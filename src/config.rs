use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Path read when nothing else names one
pub const DEFAULT_PDF_PATH: &str = "pdfs/acc_oct_24.pdf";

/// Environment variable consulted when the config has no default path
pub const PATH_ENV_VAR: &str = "PDFTEXT_PATH";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    pub default_path: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("pdftext"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the user config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a specific file, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {:?}", path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Pick the PDF to read when none was given: config, environment, then built-in default
    pub fn resolve_path(&self) -> PathBuf {
        let env_path = std::env::var_os(PATH_ENV_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.resolve_with_env(env_path)
    }

    fn resolve_with_env(&self, env_path: Option<PathBuf>) -> PathBuf {
        self.default_path
            .clone()
            .or(env_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PDF_PATH))
    }
}

/// Path to read for this run. The config file is only consulted when the
/// command line names no path.
pub fn input_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    input_path_with(cli_path, Config::load)
}

fn input_path_with<F>(cli_path: Option<PathBuf>, load: F) -> Result<PathBuf>
where
    F: FnOnce() -> Result<Config>,
{
    match cli_path {
        Some(path) => Ok(path),
        None => Ok(load()?.resolve_path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_default_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_path = \"statements/latest.pdf\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.default_path,
            Some(PathBuf::from("statements/latest.pdf"))
        );
    }

    #[test]
    fn test_bad_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_path = [").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_resolve_order() {
        let config = Config {
            default_path: Some(PathBuf::from("config.pdf")),
        };
        let env = Some(PathBuf::from("env.pdf"));

        assert_eq!(
            config.resolve_with_env(env.clone()),
            PathBuf::from("config.pdf")
        );
        assert_eq!(
            Config::default().resolve_with_env(env),
            PathBuf::from("env.pdf")
        );
        assert_eq!(
            Config::default().resolve_with_env(None),
            PathBuf::from(DEFAULT_PDF_PATH)
        );
    }

    #[test]
    fn test_cli_path_skips_bad_config() {
        let dir = TempDir::new().unwrap();
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, "default_path = [").unwrap();

        let path = input_path_with(Some(PathBuf::from("cli.pdf")), || {
            Config::load_from(&config_file)
        })
        .unwrap();
        assert_eq!(path, PathBuf::from("cli.pdf"));

        assert!(input_path_with(None, || Config::load_from(&config_file)).is_err());
    }

    #[test]
    fn test_cli_path_skips_missing_config_dir() {
        let path = input_path_with(Some(PathBuf::from("cli.pdf")), || {
            anyhow::bail!("Could not determine config directory")
        })
        .unwrap();
        assert_eq!(path, PathBuf::from("cli.pdf"));
    }
}
