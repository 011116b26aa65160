// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace labeling webhook
//!
//! Stamps the ownership marker on namespaces as they are created or updated.
//! Every failure path admits the namespace unchanged: a broken operator must
//! never block namespace creation.

use super::WebhookState;
use crate::constants::labels::INSTANCE;
use crate::kubernetes::list_agent_stacks;
use crate::labels::{compute_delta, emit};
use crate::types::{AgentStack, TargetKind};
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use kube::{
    api::DynamicObject,
    core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
    ResourceExt,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub async fn label_namespace_handler(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> Response {
    let review: AdmissionReview<DynamicObject> = match serde_json::from_slice(&body) {
        Ok(review) => review,
        Err(e) => {
            warn!(error = %e, "Failed to decode admission review, allowing unchanged");
            return Json(allow_undecoded(&body)).into_response();
        }
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Admission review carries no request, allowing unchanged");
            return Json(allow_undecoded(&body)).into_response();
        }
    };

    let response = review_namespace(&state, &request).await;
    Json(response.into_review()).into_response()
}

/// An allowing review for a body that could not be decoded, echoing its uid when one is readable
fn allow_undecoded(body: &[u8]) -> Value {
    let uid = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/request/uid").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    serde_json::json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "response": { "uid": uid, "allowed": true }
    })
}

/// How a review is handled, dispatched on the capabilities of its target kind
#[derive(Debug, PartialEq, Eq)]
enum Review {
    Label,
    Skip(&'static str),
}

fn classify(kind: &str, operation: &Operation) -> Review {
    if !matches!(operation, Operation::Create | Operation::Update) {
        return Review::Skip("operation is not create or update");
    }

    match TargetKind::from_kind(kind) {
        Some(target) if target.has_ownership_marker() => Review::Label,
        Some(target) if target.has_template_annotation() => {
            Review::Skip("workload fingerprints are written by the reconciler")
        }
        _ => Review::Skip("kind is not managed"),
    }
}

async fn review_namespace(
    state: &WebhookState,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    if let Review::Skip(reason) = classify(&request.kind.kind, &request.operation) {
        debug!(uid = %request.uid, kind = %request.kind.kind, reason, "Allowing unchanged");
        return AdmissionResponse::from(request);
    }

    let candidates =
        match list_agent_stacks(&state.client, &state.config.operator_namespace).await {
            Ok(stacks) => stacks,
            Err(e) => {
                warn!(uid = %request.uid, error = %e, "Failed to list agent stacks, allowing unchanged");
                return AdmissionResponse::from(request);
            }
        };

    mutate_namespace(request, &candidates, &state.config.operator_namespace)
}

/// Decide the ownership marker patch for a namespace admission request
pub fn mutate_namespace(
    request: &AdmissionRequest<DynamicObject>,
    candidates: &[AgentStack],
    operator_namespace: &str,
) -> AdmissionResponse {
    let Some(namespace) = request.object.as_ref() else {
        debug!(uid = %request.uid, "No namespace object in request, allowing unchanged");
        return AdmissionResponse::from(request);
    };

    let name = namespace
        .metadata
        .name
        .clone()
        .unwrap_or_else(|| request.name.clone());
    let delta = compute_delta(
        namespace.labels(),
        candidates,
        INSTANCE,
        operator_namespace,
        &name,
    );

    if !delta.is_empty() {
        info!(uid = %request.uid, namespace = %name, ops = delta.len(), "Patching ownership marker");
    }

    emit(request, &delta, namespace.metadata.labels.is_some())
}
