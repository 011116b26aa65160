// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying generated StatefulSets only when their template drifted

use crate::constants::OPERATOR_NAME;
use crate::error::{Result, TetherError};
use crate::template::{needs_update, stored_fingerprint};
use k8s_openapi::api::apps::v1::StatefulSet;
use kube::{
    api::{DeleteParams, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

/// What happened to a workload during reconciliation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadOutcome {
    Created,
    Updated,
    Unchanged,
    Deleted,
    Absent,
}

/// Apply a freshly built StatefulSet unless the live one carries the same fingerprint.
///
/// `desired` must already have its fingerprint stamped.
#[instrument(skip(client, desired), fields(name = %desired.name_any()))]
pub async fn apply_statefulset(client: &Client, desired: &StatefulSet) -> Result<WorkloadOutcome> {
    let name = desired.name_any();
    let namespace = desired
        .namespace()
        .ok_or_else(|| TetherError::MissingNamespace(format!("StatefulSet {}", name)))?;
    let fresh = stored_fingerprint(desired).ok_or_else(|| {
        TetherError::IncompleteTemplate(format!("StatefulSet {} has no fingerprint", name))
    })?;

    let api: Api<StatefulSet> = Api::namespaced(client.clone(), &namespace);
    let live = api.get_opt(&name).await?;

    if !needs_update(live.as_ref().and_then(stored_fingerprint), fresh) {
        debug!("StatefulSet {}/{} is up to date", namespace, name);
        return Ok(WorkloadOutcome::Unchanged);
    }

    api.patch(
        &name,
        &PatchParams::apply(OPERATOR_NAME).force(),
        &Patch::Apply(desired),
    )
    .await?;

    if live.is_some() {
        info!("Updated StatefulSet {}/{}", namespace, name);
        Ok(WorkloadOutcome::Updated)
    } else {
        info!("Created StatefulSet {}/{}", namespace, name);
        Ok(WorkloadOutcome::Created)
    }
}

/// Remove a StatefulSet if it exists
#[instrument(skip(client))]
pub async fn delete_statefulset(client: &Client, namespace: &str, name: &str) -> Result<WorkloadOutcome> {
    let api: Api<StatefulSet> = Api::namespaced(client.clone(), namespace);

    if api.get_opt(name).await?.is_none() {
        return Ok(WorkloadOutcome::Absent);
    }

    api.delete(name, &DeleteParams::default()).await?;
    info!("Deleted StatefulSet {}/{}", namespace, name);
    Ok(WorkloadOutcome::Deleted)
}
