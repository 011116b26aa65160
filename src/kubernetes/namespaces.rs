// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace lookups and ownership marker sync

use crate::constants::{labels::INSTANCE, CLUSTER_ID_NAMESPACE};
use crate::error::{Result, TetherError};
use crate::labels::{compute_delta, to_json_patch};
use crate::types::AgentStack;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ListParams, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument, warn};

/// Identifier of the cluster: the UID of the `kube-system` namespace
#[instrument(skip(client))]
pub async fn cluster_id(client: &Client) -> Result<String> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let namespace = namespaces.get(CLUSTER_ID_NAMESPACE).await.map_err(|e| {
        TetherError::ClusterIdentityError(format!(
            "Failed to get namespace {}: {}",
            CLUSTER_ID_NAMESPACE, e
        ))
    })?;

    namespace
        .metadata
        .uid
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| {
            TetherError::ClusterIdentityError(format!(
                "Namespace {} has no uid",
                CLUSTER_ID_NAMESPACE
            ))
        })
}

/// Re-evaluate the ownership marker on every namespace and patch the ones that
/// drifted. Returns the number of namespaces patched.
///
/// A failed patch is logged and skipped so one namespace cannot block the rest.
#[instrument(skip(client, candidates), fields(candidates = candidates.len()))]
pub async fn sync_namespace_labels(
    client: &Client,
    candidates: &[AgentStack],
    operator_namespace: &str,
) -> Result<usize> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let mut patched = 0;

    for namespace in namespaces.list(&ListParams::default()).await? {
        let name = namespace.name_any();
        let delta = compute_delta(
            namespace.labels(),
            candidates,
            INSTANCE,
            operator_namespace,
            &name,
        );

        if delta.is_empty() {
            debug!("Namespace {} already converged", name);
            continue;
        }

        let patch = to_json_patch(&delta, namespace.metadata.labels.is_some());
        match namespaces
            .patch(&name, &PatchParams::default(), &Patch::Json::<()>(patch))
            .await
        {
            Ok(_) => {
                info!("Updated ownership marker on namespace {}", name);
                patched += 1;
            }
            Err(e) => warn!("Failed to update ownership marker on namespace {}: {}", name, e),
        }
    }

    Ok(patched)
}
