use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Remote table-store settings. Absence of `url` or `anon_key` is not an
/// error: it selects the local-fallback operating mode, decided once at
/// process start.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub anon_key: Option<SecretString>,
    pub table: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub store_url: Option<String>,
    pub store_anon_key: Option<String>,
    pub analysis_api_key: Option<String>,
    pub analysis_model: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                url: None,
                anon_key: None,
                table: "operaciones".to_string(),
                timeout_secs: 30,
            },
            analysis: AnalysisConfig {
                api_key: None,
                model: "gemini-3-flash-preview".to_string(),
                timeout_secs: 30,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl StoreConfig {
    /// Binary, decided once at startup from the presence of both values.
    pub fn is_configured(&self) -> bool {
        let has_url = self.url.as_deref().is_some_and(|url| !url.trim().is_empty());
        let has_key =
            self.anon_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty());
        has_url && has_key
    }
}

impl AnalysisConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("gfv.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(url) = store.url {
                self.store.url = Some(url);
            }
            if let Some(store_anon_key_value) = store.anon_key {
                self.store.anon_key = Some(secret_value(store_anon_key_value));
            }
            if let Some(table) = store.table {
                self.store.table = table;
            }
            if let Some(timeout_secs) = store.timeout_secs {
                self.store.timeout_secs = timeout_secs;
            }
        }

        if let Some(analysis) = patch.analysis {
            if let Some(analysis_api_key_value) = analysis.api_key {
                self.analysis.api_key = Some(secret_value(analysis_api_key_value));
            }
            if let Some(model) = analysis.model {
                self.analysis.model = model;
            }
            if let Some(timeout_secs) = analysis.timeout_secs {
                self.analysis.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GFV_STORE_URL") {
            self.store.url = Some(value);
        }
        if let Some(value) = read_env("GFV_STORE_ANON_KEY") {
            self.store.anon_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GFV_STORE_TABLE") {
            self.store.table = value;
        }
        if let Some(value) = read_env("GFV_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_u64("GFV_STORE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GFV_ANALYSIS_API_KEY") {
            self.analysis.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GFV_ANALYSIS_MODEL") {
            self.analysis.model = value;
        }
        if let Some(value) = read_env("GFV_ANALYSIS_TIMEOUT_SECS") {
            self.analysis.timeout_secs = parse_u64("GFV_ANALYSIS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GFV_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("GFV_SERVER_PORT") {
            self.server.port = parse_u16("GFV_SERVER_PORT", &value)?;
        }

        let log_level = read_env("GFV_LOGGING_LEVEL").or_else(|| read_env("GFV_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("GFV_LOGGING_FORMAT").or_else(|| read_env("GFV_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(store_url) = overrides.store_url {
            self.store.url = Some(store_url);
        }
        if let Some(store_anon_key) = overrides.store_anon_key {
            self.store.anon_key = Some(secret_value(store_anon_key));
        }
        if let Some(analysis_api_key) = overrides.analysis_api_key {
            self.analysis.api_key = Some(secret_value(analysis_api_key));
        }
        if let Some(analysis_model) = overrides.analysis_model {
            self.analysis.model = analysis_model;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_analysis(&self.analysis)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("gfv.toml"), PathBuf::from("config/gfv.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if let Some(url) = store.url.as_deref() {
        let url = url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "store.url must start with http:// or https://".to_string(),
            ));
        }
    }

    if store.table.trim().is_empty() {
        return Err(ConfigError::Validation("store.table must not be empty".to_string()));
    }

    if store.timeout_secs == 0 || store.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "store.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_analysis(analysis: &AnalysisConfig) -> Result<(), ConfigError> {
    if analysis.model.trim().is_empty() {
        return Err(ConfigError::Validation("analysis.model must not be empty".to_string()));
    }

    if analysis.timeout_secs == 0 || analysis.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "analysis.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    analysis: Option<AnalysisPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    url: Option<String>,
    anon_key: Option<String>,
    table: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPatch {
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn missing_store_credentials_select_degraded_mode_not_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["GFV_STORE_URL", "GFV_STORE_ANON_KEY", "GFV_ANALYSIS_API_KEY"]);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(!config.store.is_configured(), "store should report unconfigured")?;
        ensure(!config.analysis.is_configured(), "analysis should report unconfigured")?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_GFV_ANON_KEY", "anon-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("gfv.toml");
            fs::write(
                &path,
                r#"
[store]
url = "https://tenant.example.co"
anon_key = "${TEST_GFV_ANON_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.store.is_configured(), "store should be configured from the file")?;
            ensure(
                config.store.url.as_deref() == Some("https://tenant.example.co"),
                "store url should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_GFV_ANON_KEY"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("GFV_STORE_URL", "https://from-env.example.co");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("gfv.toml");
            fs::write(
                &path,
                r#"
[store]
url = "https://from-file.example.co"
anon_key = "anon-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.url.as_deref() == Some("https://from-env.example.co"),
                "env store url should win over file",
            )?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["GFV_STORE_URL"]);
        result
    }

    #[test]
    fn malformed_store_url_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("GFV_STORE_URL", "ftp://tenant.example.co");
        env::set_var("GFV_STORE_ANON_KEY", "anon-key");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("store.url")
            );
            ensure(has_message, "validation failure should mention store.url")
        })();

        clear_vars(&["GFV_STORE_URL", "GFV_STORE_ANON_KEY"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("GFV_STORE_URL", "https://tenant.example.co");
        env::set_var("GFV_STORE_ANON_KEY", "anon-secret-value");
        env::set_var("GFV_ANALYSIS_API_KEY", "analysis-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("anon-secret-value"),
                "debug output should not contain the store key",
            )?;
            ensure(
                !debug.contains("analysis-secret-value"),
                "debug output should not contain the analysis key",
            )?;
            Ok(())
        })();

        clear_vars(&["GFV_STORE_URL", "GFV_STORE_ANON_KEY", "GFV_ANALYSIS_API_KEY"]);
        result
    }
}
