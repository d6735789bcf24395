use crate::constants;
use crate::error::{LoaderError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mlb_loader.toml";
/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "MLB_LOADER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sources: SourcesConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub foreign_keys: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mlb.db"),
            foreign_keys: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub dir: PathBuf,
    pub delimiter: char,
    pub game_log: String,
    pub park_codes: String,
    pub person_codes: String,
    pub team_codes: String,
    /// Optional; the built-in role codes are always seeded.
    pub appearance_types: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            delimiter: ',',
            game_log: constants::GAME_LOG_FILE.to_string(),
            park_codes: constants::PARK_CODES_FILE.to_string(),
            person_codes: constants::PERSON_CODES_FILE.to_string(),
            team_codes: constants::TEAM_CODES_FILE.to_string(),
            appearance_types: constants::APPEARANCE_TYPE_FILE.to_string(),
        }
    }
}

impl SourcesConfig {
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Delimiter as the single byte the csv reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(LoaderError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub drop_staging: bool,
    pub include_lineups: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            drop_staging: true,
            include_lineups: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "mlb_loader.log".to_string(),
            default_filter: "mlb_loader=info,warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder at startup.
    pub enabled: bool,
    /// Where `run` writes the rendered snapshot; logged at debug level when unset.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, `MLB_LOADER_CONFIG`, or
    /// `mlb_loader.toml` in the working directory. Falls back to defaults when
    /// no file is found; an explicitly requested file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Self::from_file(Path::new(path.trim()));
            }
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LoaderError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.sources.delimiter_byte()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("mlb.db"));
        assert!(config.database.foreign_keys);
        assert!(config.pipeline.drop_staging);
        assert!(!config.pipeline.include_lineups);
        assert_eq!(config.sources.game_log, "game_log.csv");
        assert_eq!(config.sources.delimiter_byte().unwrap(), b',');
        assert!(config.metrics.enabled);
        assert!(config.metrics.snapshot_path.is_none());
    }

    #[test]
    fn test_metrics_section() {
        let config = Config::from_toml(
            r#"
            [metrics]
            enabled = false
            snapshot_path = "out/metrics.prom"
            "#,
        )
        .unwrap();
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.snapshot_path, Some(PathBuf::from("out/metrics.prom")));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [database]
            path = "out/retro.db"

            [pipeline]
            include_lineups = true
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("out/retro.db"));
        assert!(config.database.foreign_keys);
        assert!(config.pipeline.include_lineups);
        assert!(config.pipeline.drop_staging);
        assert_eq!(config.sources.team_codes, "team_codes.csv");
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = Config::from_toml("[sources]\ndelimiter = \"§\"\n").unwrap_err();
        assert!(matches!(err, LoaderError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, LoaderError::Config(_)));
    }
}
