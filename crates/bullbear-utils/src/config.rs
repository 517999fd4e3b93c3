//! Environment and secret-file helpers for configuration loading

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration sources
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but unparsable
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Key file missing or unreadable
    #[error("cannot read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key file readable but blank
    #[error("key file {0} is empty")]
    EmptyKeyFile(PathBuf),
}

/// Read `key` from the environment, falling back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse `key` from the environment; `Ok(None)` when unset
pub fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Read an API key stored alone in a file, trimming surrounding whitespace
pub fn read_key_file(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;

    let key = raw.trim();
    if key.is_empty() {
        return Err(ConfigError::EmptyKeyFile(path.to_path_buf()));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default() {
        assert_eq!(env_or("BULLBEAR_TEST_SURELY_UNSET", "fallback"), "fallback");
    }

    #[test]
    fn test_env_parse_unset() {
        let value: Option<u64> = env_parse("BULLBEAR_TEST_SURELY_UNSET_NUM").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_key_file_trims() {
        let path = std::env::temp_dir().join(format!("bullbear-key-{}", std::process::id()));
        std::fs::write(&path, "  sk-test-123\n").unwrap();

        assert_eq!(read_key_file(&path).unwrap(), "sk-test-123");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_key_file_missing() {
        let result = read_key_file("/definitely/not/here/API_KEY");
        assert!(matches!(result, Err(ConfigError::KeyFile { .. })));
    }
}
