/*
 * Responsibility
 * - Load Config, then initialise tracing for APP_ENV
 * - Build the verifier and filter, assemble the Router, apply HTTP middleware
 * - Serve with axum::serve()
 */
use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{AppEnv, Config},
    middleware::{self, auth::BearerAuth},
    services::auth::{build_admin_overrides, build_verifier},
};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);

    tracing::info!(addr = %config.addr, env = ?config.app_env, "starting");

    let app = build_router(&config)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Used when `RUST_LOG` is unset. Per-request `tower_http` spans stay out of production logs.
fn default_log_filter(env: AppEnv) -> &'static str {
    if env.is_production() {
        "info"
    } else {
        "info,tower_http=debug"
    }
}

/// JSON lines in production, human-readable output otherwise.
fn init_tracing(env: AppEnv) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(env)));
    let registry = tracing_subscriber::registry().with(filter);

    if env.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

pub fn build_router(config: &Config) -> Result<Router> {
    let verifier = build_verifier(config).context("building token verifier")?;
    let admin_overrides =
        build_admin_overrides(config).context("building admin route overrides")?;

    let filter = BearerAuth::new(verifier);

    let router = Router::new().nest("/api/v1", api::v1::routes(&filter, admin_overrides));
    Ok(middleware::http::apply(router, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_drops_tower_http_debug() {
        assert_eq!(default_log_filter(AppEnv::Production), "info");
        assert_eq!(
            default_log_filter(AppEnv::Development),
            "info,tower_http=debug"
        );
    }

    #[test]
    fn default_filters_parse() {
        for env in [AppEnv::Development, AppEnv::Production] {
            assert!(EnvFilter::try_new(default_log_filter(env)).is_ok());
        }
    }
}
