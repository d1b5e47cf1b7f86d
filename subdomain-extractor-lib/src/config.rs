//! Configuration file parsing and management.
//!
//! This module handles loading defaults from TOML files and `SE_*`
//! environment variables, and merging file configurations with proper
//! precedence rules.

use crate::error::ExtractorError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Maximum concurrent fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Maximum fetch starts per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rps: Option<u32>,

    /// Accept invalid certificates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Per-request timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid TOML,
    /// or holds out-of-range values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractorError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ExtractorError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            ExtractorError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is applied first, then the global file in `$HOME`, then the
    /// local file in the working directory, each overriding the previous.
    pub fn discover_and_load(&self) -> Result<FileConfig> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!("ignoring config file {}: {}", path.display(), e);
                }
            }
        }

        if self.verbose {
            for path in &loaded_files {
                tracing::info!("loaded config file {}", path.display());
            }
        }

        Ok(merged_config)
    }

    /// Local configuration file in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./subdomain-extractor.toml", "./.subdomain-extractor.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Global configuration file in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".subdomain-extractor.toml", "subdomain-extractor.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// XDG configuration file.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("subdomain-extractor").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` take precedence.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    threads: higher_defaults.threads.or(lower_defaults.threads),
                    rps: higher_defaults.rps.or(lower_defaults.rps),
                    insecure: higher_defaults.insecure.or(lower_defaults.insecure),
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<()> {
        let Some(defaults) = &config.defaults else {
            return Ok(());
        };

        if defaults.threads == Some(0) {
            return Err(ExtractorError::config("threads must be at least 1"));
        }

        if defaults.rps == Some(0) {
            return Err(ExtractorError::config("rps must be at least 1"));
        }

        if let Some(timeout_str) = &defaults.timeout {
            if parse_timeout_string(timeout_str).is_none() {
                return Err(ExtractorError::config(format!(
                    "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                    timeout_str
                )));
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub threads: Option<usize>,
    pub rps: Option<u32>,
    pub insecure: Option<bool>,
    pub timeout: Option<Duration>,
    pub config: Option<String>,
}

/// Load configuration from `SE_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok(), verbose)
}

/// Same as [`load_env_config`] with an injectable variable lookup.
pub fn load_env_config_from<L>(lookup: L, verbose: bool) -> EnvConfig
where
    L: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // SE_THREADS - concurrent fetches
    if let Some(val) = lookup("SE_THREADS") {
        match val.trim().parse::<usize>() {
            Ok(threads) if threads > 0 => {
                env_config.threads = Some(threads);
                if verbose {
                    tracing::info!("using SE_THREADS={}", threads);
                }
            }
            _ => tracing::warn!("invalid SE_THREADS='{}', must be a positive integer", val),
        }
    }

    // SE_RPS - fetch starts per second
    if let Some(val) = lookup("SE_RPS") {
        match val.trim().parse::<u32>() {
            Ok(rps) if rps > 0 => {
                env_config.rps = Some(rps);
                if verbose {
                    tracing::info!("using SE_RPS={}", rps);
                }
            }
            _ => tracing::warn!("invalid SE_RPS='{}', must be a positive integer", val),
        }
    }

    // SE_INSECURE - skip certificate validation
    if let Some(val) = lookup("SE_INSECURE") {
        match parse_bool(&val) {
            Some(insecure) => {
                env_config.insecure = Some(insecure);
                if verbose {
                    tracing::info!("using SE_INSECURE={}", insecure);
                }
            }
            None => tracing::warn!("invalid SE_INSECURE='{}', use true/false", val),
        }
    }

    // SE_TIMEOUT - per-request timeout
    if let Some(val) = lookup("SE_TIMEOUT") {
        match parse_timeout_string(&val) {
            Some(timeout) => {
                env_config.timeout = Some(timeout);
                if verbose {
                    tracing::info!("using SE_TIMEOUT={}", val);
                }
            }
            None => tracing::warn!(
                "invalid SE_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                val
            ),
        }
    }

    // SE_CONFIG - explicit config file
    if let Some(path) = lookup("SE_CONFIG") {
        if !path.trim().is_empty() {
            if verbose {
                tracing::info!("using SE_CONFIG={}", path);
            }
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into a duration.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
threads = 25
rps = 5
insecure = false
timeout = "10s"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.threads, Some(25));
        assert_eq!(defaults.rps, Some(5));
        assert_eq!(defaults.insecure, Some(false));
        assert_eq!(defaults.timeout, Some("10s".to_string()));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let manager = ConfigManager::new(false);

        for content in [
            "[defaults]\nthreads = 0\n",
            "[defaults]\nrps = 0\n",
            "[defaults]\ntimeout = \"soon\"\n",
            "[defaults\nthreads = 1\n",
        ] {
            let temp_file = write_config(content);
            assert!(manager.load_file(temp_file.path()).is_err(), "{content}");
        }
    }

    #[test]
    fn test_missing_file_is_a_file_error() {
        let manager = ConfigManager::new(false);
        let err = manager.load_file("/no/such/subdomain-extractor.toml").unwrap_err();
        assert!(matches!(err, ExtractorError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(10),
                rps: Some(20),
                insecure: Some(true),
                ..Default::default()
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                threads: Some(25),
                insecure: Some(false),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.threads, Some(25)); // Higher wins
        assert_eq!(defaults.rps, Some(20)); // Lower preserved
        assert_eq!(defaults.insecure, Some(false)); // Higher wins
        assert_eq!(defaults.timeout, None);
    }

    #[test]
    fn test_merge_with_missing_side() {
        let manager = ConfigManager::new(false);
        let only = FileConfig {
            defaults: Some(DefaultsConfig {
                rps: Some(3),
                ..Default::default()
            }),
        };

        let merged = manager.merge_configs(FileConfig::default(), only.clone());
        assert_eq!(merged, only);
        let merged = manager.merge_configs(only.clone(), FileConfig::default());
        assert_eq!(merged, only);
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SE_THREADS", "4"),
            ("SE_RPS", "7"),
            ("SE_INSECURE", "off"),
            ("SE_TIMEOUT", "1m"),
            ("SE_CONFIG", "/tmp/se.toml"),
        ]);

        let env_config = load_env_config_from(|k| vars.get(k).map(|v| v.to_string()), false);

        assert_eq!(
            env_config,
            EnvConfig {
                threads: Some(4),
                rps: Some(7),
                insecure: Some(false),
                timeout: Some(Duration::from_secs(60)),
                config: Some("/tmp/se.toml".to_string()),
            }
        );
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SE_THREADS", "0"),
            ("SE_RPS", "fast"),
            ("SE_INSECURE", "maybe"),
            ("SE_TIMEOUT", "-3"),
            ("SE_CONFIG", "  "),
        ]);

        let env_config = load_env_config_from(|k| vars.get(k).map(|v| v.to_string()), false);
        assert_eq!(env_config, EnvConfig::default());
    }
}
