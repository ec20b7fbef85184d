//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::SidecarConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
/// Overrides `downstream_url`.
pub const DOWNSTREAM_URL_ENV: &str = "SIDECAR_DOWNSTREAM_URL";
/// Overrides `log_prefix`.
pub const LOG_PREFIX_ENV: &str = "SIDECAR_LOG_PREFIX";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("cannot locate config file: {0}")]
    Locate(std::io::Error),
}

/// Load a `.env` file into the process environment.
///
/// Returns `Ok(false)` when the file does not exist. Variables already set in
/// the environment win over the file.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick the config file: explicit path, then `CONFIG_PATH`, then `<exe>.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let exe = env::current_exe().map_err(ConfigError::Locate)?;
    Ok(exe.with_extension("toml"))
}

/// Parse configuration text and apply overrides, without validating.
pub fn parse_config(content: &str) -> Result<SidecarConfig, ConfigError> {
    let mut config: SidecarConfig = toml::from_str(content)?;
    apply_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

/// Apply overrides from a key lookup (the process environment in production).
pub fn apply_overrides<F>(config: &mut SidecarConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(DOWNSTREAM_URL_ENV).filter(|v| !v.is_empty()) {
        config.downstream_url = url;
    }
    if let Some(prefix) = lookup(LOG_PREFIX_ENV) {
        config.log_prefix = prefix;
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SidecarConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(&dir.path().join(".env")).unwrap());
    }

    #[test]
    fn test_env_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SIDECAR_LOADER_TEST_VALUE=from-file").unwrap();

        assert!(load_env_file(file.path()).unwrap());
        assert_eq!(env::var("SIDECAR_LOADER_TEST_VALUE").unwrap(), "from-file");
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this line has no equals sign").unwrap();

        let err = load_env_file(file.path()).unwrap_err();
        assert!(!err.not_found());
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            downstream_url = "http://127.0.0.1:9000"
            allowlist = ["/company", "/company/{{id}}"]
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.allowlist, vec!["/company", "/company/{id}"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "downstream_url = ").unwrap();
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"downstream_url = "ftp://files""#).unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("Validation failed: downstream_url"));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (DOWNSTREAM_URL_ENV, "http://override:1"),
            (LOG_PREFIX_ENV, "[env]"),
        ]
        .into_iter()
        .collect();

        let mut config = SidecarConfig::default();
        config.downstream_url = "http://file:1".into();
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.downstream_url, "http://override:1");
        assert_eq!(config.log_prefix, "[env]");
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/etc/sidecar.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/sidecar.toml"));
    }
}
