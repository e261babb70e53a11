use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub storage: StorageConfig,
    pub project: ProjectConfig,
    pub clean: CleanConfig,
}

/// User overrides for probed install locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub android_sdk: Option<PathBuf>,
    pub gradle_home: Option<PathBuf>,
    pub avd_home: Option<PathBuf>,
    pub konan_home: Option<PathBuf>,
    pub java_home: Option<PathBuf>,
    /// Additional directories searched for JDK installations
    pub extra_jdk_dirs: Vec<PathBuf>,
    /// Additional IDE cache/config roots
    pub extra_ide_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Number of parallel threads (0 = auto)
    pub parallel_threads: usize,
    /// Use `du` for folder sizes where available
    pub use_du: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Maximum depth when looking for build files
    pub max_depth: usize,
    /// Directory names skipped during discovery
    pub exclude_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Maximum scan depth
    pub max_depth: usize,
    /// Directory names skipped while looking for build folders
    pub exclude_patterns: Vec<String>,
    /// Pause between two deletions, in milliseconds
    pub delete_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            parallel_threads: 0,
            use_du: cfg!(unix),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            exclude_dirs: Vec::new(),
        }
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            exclude_patterns: vec![".git".to_string(), "node_modules".to_string()],
            delete_delay_ms: 150,
        }
    }
}

/// Upper bound for the pause between deletions.
pub const MAX_DELETE_DELAY_MS: u64 = 10_000;

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("droid-sweeper").join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; an
    /// explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        Self::from_toml(&content, &path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "project.max_depth must be at least 1".to_string(),
            ));
        }
        if self.clean.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "clean.max_depth must be at least 1".to_string(),
            ));
        }
        if self.clean.delete_delay_ms > MAX_DELETE_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "clean.delete_delay_ms must not exceed {}",
                MAX_DELETE_DELAY_MS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clean.max_depth, 6);
        assert_eq!(config.project.max_depth, 8);
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[clean]"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn default_clean_excludes_vcs() {
        let config = CleanConfig::default();
        assert!(config.exclude_patterns.contains(&".git".to_string()));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = Config::from_toml("[clean]\nmax_depth = 0\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn path_overrides_are_read() {
        let config = Config::from_toml(
            "[paths]\nandroid_sdk = \"/opt/sdk\"\nextra_jdk_dirs = [\"/opt/jdks\"]\n",
            Path::new("c.toml"),
        )
        .unwrap();
        assert_eq!(config.paths.android_sdk, Some(PathBuf::from("/opt/sdk")));
        assert_eq!(config.paths.extra_jdk_dirs, vec![PathBuf::from("/opt/jdks")]);
        assert!(config.paths.gradle_home.is_none());
    }
}
