//! Elevate server: IAP-authenticated eligibility API.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod app;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eligibility::{EligibilityEvaluator, EligibilityLocalClient};
use iap_authn::infra::{HttpKeySetSource, KeyRefresher, SigningKeyCache};
use iap_authn::{ConfiguredEnvironment, JwtAssertionVerifier, RequestAuthenticator, TracingAuditLog};
use iap_authn_sdk::RuntimeEnvironment;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::AppState;
use crate::config::{AppConfig, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "elevate-server", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        let yaml = serde_saphyr::to_string(&config).context("failed to render configuration")?;
        print!("{yaml}");
        return Ok(());
    }

    init_logging(&config.logging)?;
    run(&config).await
}

fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(cfg.json.then(|| fmt::layer().json()))
        .with((!cfg.json).then(fmt::layer))
        .try_init()
        .context("failed to install tracing subscriber")
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let environment =
        ConfiguredEnvironment::from_config(&config.runtime).context("invalid runtime configuration")?;
    let cancel = CancellationToken::new();

    let keys = Arc::new(SigningKeyCache::new());
    let refresher = if environment.static_principal().is_some() {
        tracing::warn!("Static principal configured; IAP assertions are not checked");
        None
    } else {
        let source = HttpKeySetSource::new(&config.iap.jwks_url, config.iap.fetch_timeout)
            .context("failed to build signing key client")?;
        let refresher = KeyRefresher::new(keys.clone(), Arc::new(source), &config.iap);
        Some(refresher.spawn(cancel.child_token()))
    };

    let verifier = JwtAssertionVerifier::new(keys, config.iap.leeway);
    let authenticator = RequestAuthenticator::new(
        Arc::new(verifier),
        Arc::new(environment),
        Arc::new(TracingAuditLog),
    );
    tracing::info!(audience = authenticator.expected_audience(), "IAP gate ready");

    let backend = static_policy_plugin::Service::from_config(&config.policy)
        .context("invalid policy configuration")?;
    let evaluator = EligibilityEvaluator::new(Arc::new(backend), &config.eligibility);
    let state = AppState {
        eligibility: Arc::new(EligibilityLocalClient::new(Arc::new(evaluator))),
    };
    let router = app::router(state, Arc::new(authenticator));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "HTTP server bound");

    let shutdown = shutdown_signal(cancel.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    cancel.cancel();
    if let Some(handle) = refresher
        && let Err(e) = handle.await
    {
        tracing::warn!(error = %e, "Signing key refresher did not stop cleanly");
    }
    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        }
        () = cancel.cancelled() => {}
    }
    tracing::info!("HTTP server shutting down gracefully");
    cancel.cancel();
}
