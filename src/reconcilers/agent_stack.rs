// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! AgentStack reconciler - rolls out capability workloads and re-evaluates
//! namespace ownership whenever a stack changes.

use crate::config::Config;
use crate::error::{Result, TetherError};
use crate::kubernetes::{
    apply_secret, apply_statefulset, build_custom_properties_secret, cluster_id,
    delete_statefulset, list_agent_stacks, sync_namespace_labels, WorkloadOutcome,
};
use crate::template::fingerprint;
use crate::template::statefulset::{build_statefulset, statefulset_name, StatefulSetProperties};
use crate::types::{AgentStack, Capability, CapabilityProperties};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const REQUEUE_SECS: u64 = 300;
const ERROR_REQUEUE_SECS: u64 = 60;

pub struct AgentStackReconciler {
    client: Client,
    config: Config,
}

impl AgentStackReconciler {
    pub fn new(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let stacks: Api<AgentStack> =
            Api::namespaced(self.client.clone(), &self.config.operator_namespace);
        let context = Arc::new(self);

        Controller::new(stacks, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled agent stack: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

/// Literal custom properties, used only when no secret reference is given
fn literal_custom_properties(properties: &CapabilityProperties) -> Option<&str> {
    let source = properties.custom_properties.as_ref()?;
    if source.value_from.as_deref().is_some_and(|s| !s.is_empty()) {
        return None;
    }
    source.value.as_deref().filter(|v| !v.is_empty())
}

#[instrument(skip(ctx, stack, properties), fields(stack = %stack.name_any(), feature = capability.feature()))]
async fn reconcile_capability(
    ctx: &AgentStackReconciler,
    stack: &AgentStack,
    capability: Capability,
    properties: &CapabilityProperties,
    cluster: &str,
) -> Result<WorkloadOutcome> {
    let custom_properties_hash = match literal_custom_properties(properties) {
        Some(value) => {
            let secret = build_custom_properties_secret(stack, capability, value)?;
            apply_secret(&ctx.client, &secret).await?;
            fingerprint(value.as_bytes())
        }
        None => String::new(),
    };

    let desired = build_statefulset(&StatefulSetProperties::new(
        stack,
        capability,
        properties,
        cluster,
        custom_properties_hash,
    ))?;

    apply_statefulset(&ctx.client, &desired).await
}

async fn reconcile(stack: Arc<AgentStack>, ctx: Arc<AgentStackReconciler>) -> Result<Action> {
    let name = stack.name_any();
    let namespace = stack
        .namespace()
        .ok_or_else(|| TetherError::MissingNamespace(format!("AgentStack {}", name)))?;

    debug!("Reconciling agent stack: {}", name);

    let cluster = cluster_id(&ctx.client).await?;

    for capability in Capability::ALL {
        let outcome = match stack.enabled_capability(capability) {
            Some(properties) => {
                reconcile_capability(&ctx, &stack, capability, properties, &cluster).await?
            }
            None => {
                delete_statefulset(&ctx.client, &namespace, &statefulset_name(&stack, capability))
                    .await?
            }
        };
        debug!(
            "Capability {} of {}: {:?}",
            capability.feature(),
            name,
            outcome
        );
    }

    let candidates = list_agent_stacks(&ctx.client, &ctx.config.operator_namespace).await?;
    let patched =
        sync_namespace_labels(&ctx.client, &candidates, &ctx.config.operator_namespace).await?;
    if patched > 0 {
        info!("Updated ownership marker on {} namespaces", patched);
    }

    Ok(Action::requeue(Duration::from_secs(REQUEUE_SECS)))
}

fn error_policy(
    _stack: Arc<AgentStack>,
    error: &TetherError,
    _ctx: Arc<AgentStackReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_SECS))
}
