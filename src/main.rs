// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};

use tether::config::Config;
use tether::kubernetes::wait_for_agent_stack_crd;
use tether::reconcilers::AgentStackReconciler;
use tether::webhook::{self, WebhookState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting Tether operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: operator_namespace={}, webhook_port={}",
        config.operator_namespace, config.webhook_port
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // The webhook lists AgentStacks, so it waits for the CRD as well
    info!("Waiting for AgentStack CRD to become available...");
    wait_for_agent_stack_crd(&client).await?;

    let reconciler = AgentStackReconciler::new(client.clone(), config.clone());
    let webhook_state = WebhookState::new(client, config);

    info!("Starting reconciler and webhook server...");

    tokio::try_join!(reconciler.run(), webhook::serve(webhook_state))?;

    warn!("Reconciler and webhook server stopped unexpectedly");
    Ok(())
}
