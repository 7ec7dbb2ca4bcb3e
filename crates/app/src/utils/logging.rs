use estatedesk_domain::LoggingConfig;
use estatedesk_infra::api::{ApiError, ApiErrorCategory};
use tracing_subscriber::EnvFilter;

/// Crates whose events follow the configured level; everything else logs at
/// `warn`.
const APP_TARGETS: [&str; 4] =
    ["estatedesk", "estatedesk_app", "estatedesk_infra", "estatedesk_common"];

/// Set up the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_tracing(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if config.json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
}

fn default_filter(level: &str) -> EnvFilter {
    let directives = APP_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Convert an `ApiError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &ApiError) -> &'static str {
    if error.is_session_expired() {
        return "session_expired";
    }

    match error.category() {
        ApiErrorCategory::Authentication => "auth",
        ApiErrorCategory::RateLimit => "rate_limit",
        ApiErrorCategory::Server => "server",
        ApiErrorCategory::Client => "client",
        ApiErrorCategory::Network => "network",
        ApiErrorCategory::Decode => "decode",
        ApiErrorCategory::Config => "config",
    }
}
