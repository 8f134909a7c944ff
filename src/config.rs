//! Pulsegate configuration — deserialization and validation.

use crate::error::GatewayError;
use serde::Deserialize;
use std::path::Path;

/// Primary interpreter override — checked first, wins when non-empty.
pub const INTERPRETER_ENV_PRIMARY: &str = "PULSEGATE_INTERPRETER";

/// Secondary interpreter fallback — checked when the primary is unset/empty.
pub const INTERPRETER_ENV_FALLBACK: &str = "PYTHON_BIN";

/// Built-in interpreter default when no override, fallback, or config value is set.
const INTERPRETER_DEFAULT: &str = "python3";

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

/// Top-level Pulsegate configuration, parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bind address for the HTTP server.
    #[serde(default = "default_listen")]
    pub listen: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cli: CliBridgeConfig,
}

/// Admin credential verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Env-var reference (`${VAR}`) to the HS256 signing secret. Literal
    /// secrets are rejected by `validate()` so they never land in config files.
    pub secret: String,
}

impl AuthConfig {
    /// Resolve the signing secret from its env-var reference.
    pub fn resolve_secret(&self) -> crate::Result<String> {
        let var_name = parse_env_ref(&self.secret).ok_or_else(|| {
            GatewayError::InvalidConfig(
                "auth.secret must be a ${VAR} env reference, not a literal value".to_string(),
            )
        })?;
        let secret = std::env::var(var_name).unwrap_or_default();
        if secret.is_empty() {
            return Err(GatewayError::InvalidConfig(format!(
                "auth secret env var '{}' is unset or empty",
                var_name
            )));
        }
        Ok(secret)
    }
}

/// Settings for the external analytical CLI process.
#[derive(Debug, Clone, Deserialize)]
pub struct CliBridgeConfig {
    /// Interpreter path used when neither env override is set.
    pub interpreter: Option<String>,
    /// Target analytical module, run as `<interpreter> -m <module>`.
    #[serde(default = "default_module")]
    pub module: String,
    /// Wall-clock budget per invocation; the process is killed on expiry.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Exit codes the CLI uses to signal invalid input (mapped to 400).
    #[serde(default = "default_validation_exit_codes")]
    pub validation_exit_codes: Vec<i32>,
}

impl Default for CliBridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            module: default_module(),
            timeout_secs: default_timeout_secs(),
            validation_exit_codes: default_validation_exit_codes(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_module() -> String {
    "pulse_lab.cli".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_validation_exit_codes() -> Vec<i32> {
    vec![2]
}

impl CliBridgeConfig {
    /// Resolve the interpreter path: primary env override, secondary env
    /// fallback, config value, built-in default. First non-empty wins.
    pub fn resolve_interpreter(&self) -> String {
        for var in [INTERPRETER_ENV_PRIMARY, INTERPRETER_ENV_FALLBACK] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    return value;
                }
            }
        }
        match &self.interpreter {
            Some(path) if !path.is_empty() => path.clone(),
            _ => INTERPRETER_DEFAULT.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Read and parse a pulsegate.toml config file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::InvalidConfig(format!("failed to read config file {:?}: {}", path, e))
        })?;
        let config: GatewayConfig = toml::from_str(&content).map_err(|e| {
            GatewayError::InvalidConfig(format!("failed to parse config file {:?}: {}", path, e))
        })?;
        Ok(config)
    }

    /// Validate the config, failing fast on misconfigurations before the
    /// server starts accepting requests.
    pub fn validate(&self) -> crate::Result<()> {
        if parse_env_ref(&self.auth.secret).is_none() {
            return Err(GatewayError::InvalidConfig(format!(
                "auth.secret must be a ${{VAR}} env reference, got '{}'",
                self.auth.secret
            )));
        }

        if self.cli.module.is_empty() {
            return Err(GatewayError::InvalidConfig(
                "cli.module must be non-empty".to_string(),
            ));
        }

        if self.cli.timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig(
                "cli.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.cli.validation_exit_codes.contains(&0) {
            return Err(GatewayError::InvalidConfig(
                "cli.validation_exit_codes must not contain 0".to_string(),
            ));
        }

        Ok(())
    }
}
