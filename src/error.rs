use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core library errors
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Version catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Other(String),
}

impl SweeperError {
    /// Map an I/O error on `path` into the matching error category.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => SweeperError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => SweeperError::PathNotFound(path.to_path_buf()),
            _ => SweeperError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Short message suitable for an error banner or a failed row.
    pub fn user_message(&self) -> String {
        match self {
            SweeperError::PermissionDenied(path) => {
                format!("Permission denied while accessing {}", path.display())
            }
            SweeperError::PathNotFound(path) => format!("{} does not exist", path.display()),
            SweeperError::Io { path, source } => {
                format!("Could not access {}: {}", path.display(), source)
            }
            other => other.to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while decoding a `libs.versions.toml` file
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse catalog '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SweeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ConfigError::Invalid("max_depth must be at least 1".into());
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn error_conversion() {
        let config_err = ConfigError::Invalid("test".into());
        let sweeper_err: SweeperError = config_err.into();
        assert!(matches!(sweeper_err, SweeperError::Config(_)));
    }

    #[test]
    fn io_errors_are_categorized() {
        let path = Path::new("/some/where");

        let denied = SweeperError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, SweeperError::PermissionDenied(_)));
        assert!(denied.user_message().contains("Permission denied"));

        let missing = SweeperError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing, SweeperError::PathNotFound(_)));

        let other = SweeperError::from_io(path, io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(matches!(other, SweeperError::Io { .. }));
        assert!(other.user_message().contains("boom"));
    }
}
