//! Tally API Server
//!
//! Main entry point for the Tally backend service.

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, create_router};
use tally_db::{DbStore, connect};
use tally_shared::{
    AppConfig, DevIdentityVerifier, GoogleIdentityVerifier, IdentityVerifier, JwtConfig,
    JwtService,
    config::{IdentityConfig, is_production},
};

/// Picks the identity verifier for sign-in.
///
/// Google when a client id is configured; the insecure local verifier only
/// when explicitly allowed outside production.
fn identity_verifier(config: &IdentityConfig) -> anyhow::Result<Arc<dyn IdentityVerifier>> {
    if let Some(client_id) = config
        .google_client_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    {
        let verifier = GoogleIdentityVerifier::new(client_id)
            .context("Failed to build Google identity verifier")?;
        info!("Google sign-in enabled");
        return Ok(Arc::new(verifier));
    }

    if !config.allow_insecure_dev {
        bail!("identity.google_client_id is not set and identity.allow_insecure_dev is false");
    }
    if is_production() {
        bail!("identity.allow_insecure_dev cannot be used with RUN_MODE=production");
    }

    warn!("Insecure local sign-in enabled: any token is accepted");
    Ok(Arc::new(DevIdentityVerifier))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let identity = identity_verifier(&config.identity)?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let store = Arc::new(DbStore::new(db));
    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    let state = AppState::new(store.clone(), store, Arc::new(jwt_service), identity);

    let app = create_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(client_id: Option<&str>, allow_insecure_dev: bool) -> IdentityConfig {
        IdentityConfig {
            google_client_id: client_id.map(str::to_string),
            allow_insecure_dev,
        }
    }

    #[test]
    fn test_google_verifier_when_client_id_set() {
        let config = identity(Some("client.apps.googleusercontent.com"), false);
        assert!(identity_verifier(&config).is_ok());
    }

    #[test]
    fn test_no_verifier_without_opt_in() {
        temp_env::with_var("RUN_MODE", Some("development"), || {
            assert!(identity_verifier(&identity(None, false)).is_err());
            assert!(identity_verifier(&identity(Some("  "), false)).is_err());
        });
    }

    #[test]
    fn test_dev_verifier_refused_in_production() {
        temp_env::with_var("RUN_MODE", Some("production"), || {
            assert!(identity_verifier(&identity(None, true)).is_err());
        });
        temp_env::with_var("RUN_MODE", Some("development"), || {
            assert!(identity_verifier(&identity(None, true)).is_ok());
        });
    }
}
