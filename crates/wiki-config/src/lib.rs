//! Configuration management for the wiki.
//!
//! Parses `wiki.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `auth.username`
//! - `auth.password`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override pages directory.
    pub pages_dir: Option<PathBuf>,
    /// Override templates directory.
    pub templates_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wiki.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Pages configuration (paths are relative strings from TOML).
    pages: PagesConfigRaw,
    /// Templates configuration (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,
    /// Basic authentication credentials (optional section).
    pub auth: Option<AuthConfig>,

    /// Resolved pages configuration (set after loading).
    #[serde(skip)]
    pub pages_resolved: PagesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PagesConfigRaw {
    dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
}

/// Resolved page and template locations with absolute paths.
#[derive(Debug, Default)]
pub struct PagesConfig {
    /// Directory holding `<title>.txt` page files.
    pub pages_dir: PathBuf,
    /// Directory with `view.html`, `edit.html` and `all.html` overrides.
    /// `None` uses the built-in templates.
    pub templates_dir: Option<PathBuf>,
}

/// Basic authentication credentials.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Expected username.
    pub username: String,
    /// Expected password.
    pub password: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`auth.password`").
        field: String,
        /// Error message (e.g., "${`WIKI_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wiki.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(pages_dir) = &settings.pages_dir {
            self.pages_resolved.pages_dir.clone_from(pages_dir);
        }
        if let Some(templates_dir) = &settings.templates_dir {
            self.pages_resolved.templates_dir = Some(templates_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            pages: PagesConfigRaw::default(),
            templates: TemplatesConfigRaw::default(),
            auth: None,
            pages_resolved: PagesConfig {
                pages_dir: base.join("pages"),
                templates_dir: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        if let Some(auth) = &self.auth {
            require_non_empty(&auth.username, "auth.username")?;
            if auth.username.contains(':') {
                return Err(ConfigError::Validation(
                    "auth.username cannot contain ':'".to_owned(),
                ));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref mut auth) = self.auth {
            auth.username = expand::expand_env(&auth.username, "auth.username")?;
            auth.password = expand::expand_env(&auth.password, "auth.password")?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.pages_resolved = PagesConfig {
            pages_dir: config_dir.join(self.pages.dir.as_deref().unwrap_or("pages")),
            templates_dir: self.templates.dir.as_deref().map(|d| config_dir.join(d)),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pages_resolved.pages_dir, PathBuf::from("/test/pages"));
        assert!(config.pages_resolved.templates_dir.is_none());
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_server_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 80
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 80);
    }

    #[test]
    fn test_parse_auth_config() {
        let toml = r#"
[auth]
username = "admin"
password = "hunter2"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let auth = config.auth.unwrap();
        assert_eq!(auth.username, "admin");
        assert_eq!(auth.password, "hunter2");
    }

    #[test]
    fn test_auth_section_requires_password() {
        let toml = r#"
[auth]
username = "admin"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[pages]
dir = "wiki-pages"

[templates]
dir = "tmpl"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.pages_resolved.pages_dir,
            PathBuf::from("/project/wiki-pages")
        );
        assert_eq!(
            config.pages_resolved.templates_dir,
            Some(PathBuf::from("/project/tmpl"))
        );
    }

    #[test]
    fn test_resolve_paths_defaults() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.pages_resolved.pages_dir, PathBuf::from("/project/pages"));
        assert!(config.pages_resolved.templates_dir.is_none());
    }

    #[test]
    fn test_apply_cli_settings_host_and_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_apply_cli_settings_dirs() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            pages_dir: Some(PathBuf::from("/var/local/wiki")),
            templates_dir: Some(PathBuf::from("/etc/wiki/templates")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.pages_resolved.pages_dir,
            PathBuf::from("/var/local/wiki")
        );
        assert_eq!(
            config.pages_resolved.templates_dir,
            Some(PathBuf::from("/etc/wiki/templates"))
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pages_resolved.pages_dir, PathBuf::from("/test/pages"));
    }

    #[test]
    fn test_expand_env_vars_auth() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_WIKI_USER", "alice");
            std::env::remove_var("TEST_WIKI_PASSWORD");
        }

        let toml = r#"
[auth]
username = "${TEST_WIKI_USER}"
password = "${TEST_WIKI_PASSWORD:-changeme}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let auth = config.auth.unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "changeme");

        unsafe {
            std::env::remove_var("TEST_WIKI_USER");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_WIKI_CONFIG_TEST");
        }

        let toml = r#"
[server]
host = "${MISSING_VAR_WIKI_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("wiki.toml");
        std::fs::write(&config_path, "[pages]\ndir = \"content\"\n").unwrap();

        let config = Config::load(Some(&config_path), None).unwrap();

        assert_eq!(
            config.pages_resolved.pages_dir,
            temp_dir.path().join("content")
        );
        assert_eq!(config.config_path, Some(config_path));
    }

    #[test]
    fn test_load_cli_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("wiki.toml");
        std::fs::write(&config_path, "[server]\nport = 9000\n").unwrap();
        let settings = CliSettings {
            port: Some(9100),
            ..Default::default()
        };

        let config = Config::load(Some(&config_path), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/wiki.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_auth_username_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.auth = Some(AuthConfig {
            username: String::new(),
            password: "secret".to_owned(),
        });
        assert_validation_error(&config, &["auth.username", "empty"]);
    }

    #[test]
    fn test_validate_auth_username_with_colon() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.auth = Some(AuthConfig {
            username: "a:b".to_owned(),
            password: "secret".to_owned(),
        });
        assert_validation_error(&config, &["auth.username", "':'"]);
    }
}
