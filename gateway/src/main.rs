//! Shopify webhook gateway server.
//!
//! Verifies the HMAC signature of every inbound webhook and dispatches
//! verified requests to the mounted handler routes. The stock binary
//! mounts a logging handler for each topic in `WEBHOOK_TOPICS`; embed the
//! library to mount real handlers instead.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{extract::Request, http::StatusCode, routing::get, Json};
use serde::Serialize;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shopify_webhooks::web::health;
use shopify_webhooks::{mount, Config, HandlerModule, ModuleSet};

/// Response body the stock topic handlers return.
#[derive(Serialize)]
struct Ack {
    status: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("gateway_starting");

    // Load configuration; a missing secret or bad setting is fatal here,
    // before any route exists.
    let config = Config::from_env().context("Invalid gateway configuration")?;
    info!(
        port = config.port,
        body_limit = config.body_limit,
        comparison = ?config.comparison,
        topics = config.topics.len(),
        "config_loaded"
    );

    if config.topics.is_empty() {
        warn!("no_topics_configured");
    }

    let port = config.port;
    let modules = log_only_modules(&config.topics);

    let app = mount(config, modules)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "gateway_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("gateway_shutdown_complete");

    Ok(())
}

/// Build a module set that acknowledges and logs each configured topic.
///
/// Topics are `module/handler` pairs, e.g. `orders/create`. Topics
/// missing the handler segment are skipped with a warning.
fn log_only_modules(topics: &[String]) -> ModuleSet {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

    for topic in topics {
        let Some((module, handler)) = topic.split_once('/') else {
            warn!(topic = %topic, "topic_missing_handler_segment");
            continue;
        };
        match grouped.iter_mut().find(|(name, _)| name == module) {
            Some((_, handlers)) => handlers.push(handler.to_string()),
            None => grouped.push((module.to_string(), vec![handler.to_string()])),
        }
    }

    let mut modules = ModuleSet::new();
    for (name, handlers) in grouped {
        let mut module = HandlerModule::new(&name);
        for handler in handlers {
            let topic = format!("{}/{}", name, handler);
            module = module.handler(handler, move |_request: Request| {
                let topic = topic.clone();
                async move {
                    info!(topic = %topic, "webhook_received");
                    (StatusCode::OK, Json(Ack { status: "ok" }))
                }
            });
        }
        modules = modules.module(module);
    }

    modules
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("gateway_shutting_down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_only_modules_grouping() {
        let topics = vec![
            "orders/create".to_string(),
            "orders/updated".to_string(),
            "customers/delete".to_string(),
        ];

        let modules = log_only_modules(&topics);
        assert_eq!(
            modules.route_paths(),
            ["/orders/create", "/orders/updated", "/customers/delete"]
        );
    }

    #[test]
    fn test_log_only_modules_skips_malformed_topics() {
        let topics = vec!["orders".to_string(), "orders/create".to_string()];

        let modules = log_only_modules(&topics);
        assert_eq!(modules.route_paths(), ["/orders/create"]);
    }
}
