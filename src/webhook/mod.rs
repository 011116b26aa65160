// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mutating admission webhook server.
//!
//! Serves plain HTTP; TLS is terminated in front of the operator.

pub mod namespace;

use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use kube::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Path the MutatingWebhookConfiguration points namespace reviews at
pub const LABEL_NAMESPACE_PATH: &str = "/label-ns";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub client: Client,
    pub config: Config,
}

impl WebhookState {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(LABEL_NAMESPACE_PATH, post(namespace::label_namespace_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Bind the webhook port and serve until the server fails
pub async fn serve(state: WebhookState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.webhook_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", addr);

    axum::serve(listener, router(Arc::new(state))).await?;
    Ok(())
}
