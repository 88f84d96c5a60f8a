//! Application configuration loaded from `config.toml`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::session::{
    ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
    SessionError, parse_web_url,
};

const APP_DIR_NAME: &str = "commenter";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while reading or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A non-empty line is not `key = value`.
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax {
        /// 1-based line number.
        line: usize,
    },
    /// The key is not recognised.
    #[error("unknown configuration key: '{key}' on line {line}")]
    UnknownKey {
        /// The unrecognised key.
        key: String,
        /// 1-based line number.
        line: usize,
    },
    /// The value could not be parsed for its key.
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        /// Key being parsed.
        key: &'static str,
        /// 1-based line number.
        line: usize,
        /// What was expected.
        reason: String,
    },
    /// A numeric value is outside its accepted range.
    #[error("invalid config value for `{key}`: {value}. Expected range: {range}")]
    OutOfRange {
        /// Key being validated.
        key: &'static str,
        /// The rejected value.
        value: u64,
        /// Accepted range.
        range: &'static str,
    },
    /// `api_base_url` is not an http(s) URL with a host.
    #[error("invalid config value for `api_base_url`: '{url}' is not an http(s) URL")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerbositySetting {
    /// Info-level logging.
    #[default]
    Default,
    /// Debug-level logging.
    Verbose,
    /// Errors only.
    Quiet,
    /// Trace-level logging.
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Values read from the config file; unset keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// API base URL override.
    pub api_base_url: Option<String>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Directory for cookies and UI preferences.
    pub data_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for timeouts outside `1..=3600` and
    /// [`ConfigError::InvalidBaseUrl`] for a non-web base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(url) = &self.api_base_url
            && parse_web_url(url).is_none()
        {
            return Err(ConfigError::InvalidBaseUrl { url: url.clone() });
        }
        Ok(())
    }
}

fn validate_timeout_secs(key: &'static str, value: Option<u64>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        return Err(ConfigError::OutOfRange {
            key,
            value,
            range: "1..=3600",
        });
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Whether configuration was read from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolved settings the application runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// API base URL.
    pub api_base_url: String,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
    /// HTTP read timeout.
    pub read_timeout: Duration,
    /// Verbosity requested by the config file.
    pub verbosity: VerbositySetting,
    /// Storage directory; `None` selects the platform default.
    pub data_dir: Option<PathBuf>,
    /// Keep cookies and preferences in memory only.
    pub ephemeral: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            verbosity: VerbositySetting::Default,
            data_dir: None,
            ephemeral: false,
        }
    }
}

impl AppConfig {
    /// Applies file values over the defaults.
    #[must_use]
    pub fn from_file(file: Option<&FileConfig>) -> Self {
        let mut config = Self::default();
        let Some(file) = file else {
            return config;
        };
        if let Some(url) = &file.api_base_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(secs) = file.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.read_timeout_secs {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(verbosity) = file.verbosity {
            config.verbosity = verbosity;
        }
        config.data_dir.clone_from(&file.data_dir);
        config
    }

    /// Builds the HTTP client settings.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] when the base URL is not http(s).
    pub fn client_config(&self) -> Result<ClientConfig, SessionError> {
        Ok(ClientConfig::new(&self.api_base_url)?
            .with_timeouts(self.connect_timeout, self.read_timeout))
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/commenter/config.toml`
/// 2. `$HOME/.config/commenter/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
///
/// # Errors
///
/// Returns [`ConfigError`] when an existing file cannot be read or is invalid.
pub fn load_default_file_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path) if path.exists() => Some(load_file_config(path)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Reads and validates the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or is invalid.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&raw)
}

/// Parses `key = value` config text.
///
/// # Errors
///
/// Returns [`ConfigError`] for syntax errors, unknown keys, and invalid values.
pub fn parse_config_str(raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_number });
        };
        let value = raw_value.trim();

        match raw_key.trim() {
            "api_base_url" => {
                let parsed = parse_string_literal(value)
                    .map_err(|reason| invalid("api_base_url", line_number, reason))?;
                cfg.api_base_url = Some(with_trailing_slash(parsed));
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .map_err(|reason| invalid("connect_timeout_secs", line_number, reason))?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .map_err(|reason| invalid("read_timeout_secs", line_number, reason))?;
                cfg.read_timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .and_then(|label| parse_verbosity(&label))
                    .map_err(|reason| invalid("verbosity", line_number, reason))?;
                cfg.verbosity = Some(parsed);
            }
            "data_dir" => {
                let parsed = parse_string_literal(value)
                    .map_err(|reason| invalid("data_dir", line_number, reason))?;
                cfg.data_dir = Some(PathBuf::from(parsed));
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_number,
                });
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn invalid(key: &'static str, line: usize, reason: String) -> ConfigError {
    ConfigError::InvalidValue { key, line, reason }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String, String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return Err("expected double-quoted string".to_string());
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64, String> {
    let token = raw_value.trim();
    if token.is_empty() {
        return Err("expected integer value".to_string());
    }
    let value = token.parse::<i128>().map_err(|error| error.to_string())?;
    if value < 0 {
        return Err("expected non-negative integer".to_string());
    }
    u64::try_from(value).map_err(|_| "integer value out of range for u64".to_string())
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting, String> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        other => Err(format!(
            "'{other}': expected one of: default, verbose, quiet, debug"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
read_timeout_secs = 45
verbosity = "verbose"
"#,
        )
        .unwrap();
        assert_eq!(cfg.read_timeout_secs, Some(45));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.api_base_url.is_none());
    }

    #[test]
    fn test_parse_config_appends_trailing_slash_to_base_url() {
        let cfg = parse_config_str(r#"api_base_url = "https://api.example.com/v1""#).unwrap();
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://api.example.com/v1/"));
    }

    #[test]
    fn test_parse_config_rejects_non_web_base_url() {
        let err = parse_config_str(r#"api_base_url = "ftp://files.example.com/""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "got {err}");
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err = parse_config_str("connect_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));

        let err = parse_config_str("read_timeout_secs = 3601").unwrap_err();
        assert!(err.to_string().contains("1..=3600"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("read_timeout_secs = 4 trailing").unwrap_err();
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
data_dir = "/tmp/commenter#data" # quoted hash is kept
verbosity = "quiet" # preferred noise level
"#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/commenter#data")));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").unwrap_err();
        assert!(err.to_string().contains("unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("\nverbosity\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 2 }));
    }

    #[test]
    fn test_parse_config_rejects_unknown_verbosity() {
        let err = parse_config_str(r#"verbosity = "loud""#).unwrap_err();
        assert!(err.to_string().contains("verbosity"));
    }

    #[test]
    fn test_app_config_applies_file_values_over_defaults() {
        let file = FileConfig {
            api_base_url: Some("http://127.0.0.1:8080/".to_string()),
            connect_timeout_secs: Some(3),
            ..FileConfig::default()
        };
        let config = AppConfig::from_file(Some(&file));
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080/");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(
            config.read_timeout,
            Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS)
        );
        assert_eq!(AppConfig::from_file(None), AppConfig::default());
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }
}
