//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Attempt to load from environment variables
//! 2. If the required variable is missing, fall back to a config file
//! 3. Probe several paths for config files
//! 4. Support JSON and TOML formats
//!
//! ## Environment Variables
//! - `ESTATEDESK_API_BASE_URL`: API root, e.g. `https://desk.example.com/api` (required)
//! - `ESTATEDESK_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `ESTATEDESK_API_USER_AGENT`: User agent sent with every request
//! - `ESTATEDESK_KEYCHAIN_SERVICE`: Keychain service name for session tokens
//! - `ESTATEDESK_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `ESTATEDESK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}`, `./estatedesk.{json,toml}`
//! 2. `../config.{json,toml}`, `../../config.{json,toml}`
//! 3. The same names relative to the executable

use std::path::{Path, PathBuf};

use estatedesk_domain::{ApiConfig, Config, DeskError, LoggingConfig, Result, SessionConfig};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `DeskError::Config` if neither source yields a valid configuration
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the API base URL is required; everything else falls back to the
/// defaults of [`Config`].
///
/// # Errors
/// Returns `DeskError::Config` if the base URL is missing or a numeric value
/// does not parse.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("ESTATEDESK_API_BASE_URL")?;
    let api_defaults = ApiConfig::default();
    let timeout_seconds = match std::env::var("ESTATEDESK_API_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| DeskError::Config(format!("Invalid request timeout: {e}")))?,
        Err(_) => api_defaults.timeout_seconds,
    };

    let session_defaults = SessionConfig::default();
    let logging_defaults = LoggingConfig::default();

    Ok(Config {
        api: ApiConfig {
            base_url,
            timeout_seconds,
            user_agent: std::env::var("ESTATEDESK_API_USER_AGENT").ok(),
        },
        session: SessionConfig {
            keychain_service: std::env::var("ESTATEDESK_KEYCHAIN_SERVICE")
                .unwrap_or(session_defaults.keychain_service),
            ..session_defaults
        },
        logging: LoggingConfig {
            level: std::env::var("ESTATEDESK_LOG_LEVEL").unwrap_or(logging_defaults.level),
            json: env_bool("ESTATEDESK_LOG_JSON", logging_defaults.json),
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `DeskError::Config` if the file is missing, unreadable or invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DeskError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DeskError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DeskError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, choosing the format by file extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DeskError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DeskError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DeskError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "config.json",
        "config.toml",
        "estatedesk.json",
        "estatedesk.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| DeskError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
