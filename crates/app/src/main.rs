//! EstateDesk session smoke client
//!
//! Loads configuration, restores (or establishes) a session and lists the
//! account's properties through the authenticated request layer.

use anyhow::Context;
use estatedesk_app::utils::logging::{error_label, init_tracing};
use estatedesk_app::AppContext;
use estatedesk_domain::Credentials;
use estatedesk_infra::api::SessionEvent;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config = estatedesk_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    let ctx = AppContext::new(config).context("failed to build application context")?;
    let mut events = ctx.session_events();

    if !ctx.auth.is_authenticated().await {
        match (std::env::var("ESTATEDESK_EMAIL"), std::env::var("ESTATEDESK_PASSWORD")) {
            (Ok(email), Ok(password)) => {
                ctx.auth
                    .login(&Credentials::new(email, password))
                    .await
                    .context("login failed")?;
            }
            _ => {
                warn!("No stored session; set ESTATEDESK_EMAIL and ESTATEDESK_PASSWORD to sign in");
                return Ok(());
            }
        }
    }

    match ctx.properties.list(None).await {
        Ok(properties) => info!(count = properties.len(), "Properties loaded"),
        Err(e) => error!(kind = error_label(&e), error = %e, "Failed to load properties"),
    }

    if let Ok(SessionEvent::SignInRequired) = events.try_recv() {
        warn!("Session expired; sign in again");
    }

    Ok(())
}
