use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdmc_crm::config::Config;
use mdmc_crm::context::AppContext;

/// Entry point of the dashboard bootstrap.
///
/// Initializes logging, loads configuration, builds the shared services,
/// checks that the backend answers, then resolves the authentication state.
/// When the user is signed out, the Google sign-in URL is printed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdmc_crm=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let ctx = AppContext::new(config)?;
    tracing::info!("API client ready: {}", ctx.api.base_url());

    ctx.auth.add_auth_listener(|state| {
        tracing::info!(
            "Auth state changed: authenticated={} user={:?}",
            state.is_authenticated,
            state.user.as_ref().and_then(|u| u.email.as_deref())
        );
    });

    match ctx.api.get_health().await {
        Ok(health) if health.is_ok() => tracing::info!(
            "✓ Backend healthy ({})",
            health.service.as_deref().unwrap_or("unknown service")
        ),
        Ok(health) => tracing::warn!("Backend reports status '{}'", health.status),
        Err(e) => tracing::error!("Backend health check failed: {}", e),
    }

    if !ctx.auth.initialize().await {
        match ctx.auth.get_google_auth_url().await {
            Ok(url) => println!("Sign in with Google: {}", url),
            Err(e) => tracing::error!("Could not obtain the Google sign-in URL: {}", e),
        }
    }

    Ok(())
}
