// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::types::AgentStack;
use kube::{api::ListParams, Api, Client};
use tracing::instrument;

/// All AgentStacks in the operator namespace, the candidates for namespace ownership
#[instrument(skip(client))]
pub async fn list_agent_stacks(client: &Client, namespace: &str) -> Result<Vec<AgentStack>> {
    let api: Api<AgentStack> = Api::namespaced(client.clone(), namespace);
    Ok(api.list(&ListParams::default()).await?.items)
}
