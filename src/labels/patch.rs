// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering label deltas as JSON Patch and admission responses

use crate::labels::delta::{LabelDelta, LabelOp};
use json_patch::{AddOperation, Patch, PatchOperation, RemoveOperation, ReplaceOperation};
use jsonptr::PointerBuf;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use kube::Resource;
use serde_json::Value;
use tracing::error;

/// Render a delta as JSON Patch operations against `/metadata/labels`.
///
/// `labels_present` tells whether the object already has a labels map; an add on an
/// object without one creates the map instead of a key inside it.
pub fn to_json_patch(delta: &LabelDelta, labels_present: bool) -> Patch {
    let mut labels_present = labels_present;
    let mut ops = Vec::with_capacity(delta.len());

    for op in delta.ops() {
        let operation = match op {
            LabelOp::Add { key, value } if !labels_present => {
                labels_present = true;
                let mut labels = serde_json::Map::new();
                labels.insert(key.clone(), Value::String(value.clone()));
                PatchOperation::Add(AddOperation {
                    path: PointerBuf::from_tokens(["metadata", "labels"]),
                    value: Value::Object(labels),
                })
            }
            LabelOp::Add { key, value } => PatchOperation::Add(AddOperation {
                path: label_path(key),
                value: Value::String(value.clone()),
            }),
            LabelOp::Replace { key, value } => PatchOperation::Replace(ReplaceOperation {
                path: label_path(key),
                value: Value::String(value.clone()),
            }),
            LabelOp::Remove { key } => PatchOperation::Remove(RemoveOperation {
                path: label_path(key),
            }),
        };
        ops.push(operation);
    }

    Patch(ops)
}

fn label_path(key: &str) -> PointerBuf {
    PointerBuf::from_tokens(["metadata", "labels", key])
}

/// Build the admission response for a delta. The request is always allowed;
/// an empty delta carries no patch at all.
pub fn emit<K: Resource>(
    request: &AdmissionRequest<K>,
    delta: &LabelDelta,
    labels_present: bool,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);
    if delta.is_empty() {
        return response;
    }

    match response.clone().with_patch(to_json_patch(delta, labels_present)) {
        Ok(patched) => patched,
        Err(e) => {
            error!(uid = %request.uid, error = %e, "Failed to serialize label patch, allowing unchanged");
            response
        }
    }
}
