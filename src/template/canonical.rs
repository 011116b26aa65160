// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Canonical byte form of generated workload templates.
//!
//! Object keys are written in sorted order, `null` values and empty arrays are
//! dropped, and empty string maps (labels, annotations, selectors, resource maps)
//! are dropped, as is an empty `metadata` object. Array order is kept: env vars,
//! containers, volumes and tolerations are order-sensitive. Other empty objects
//! are kept since `emptyDir: {}` is not the same as no `emptyDir`.

use crate::constants::annotations::TEMPLATE_HASH;
use crate::error::{Result, TetherError};
use k8s_openapi::api::apps::v1::StatefulSet;
use serde_json::Value;

/// Fields where an empty object and an absent field mean the same thing
const EMPTY_AS_ABSENT: &[&str] = &[
    "annotations",
    "labels",
    "limits",
    "matchLabels",
    "metadata",
    "nodeSelector",
    "requests",
];

/// Produce the canonical bytes of a StatefulSet template, excluding its own fingerprint annotation.
pub fn canonicalize(sts: &StatefulSet) -> Result<Vec<u8>> {
    validate(sts)?;

    let mut value = serde_json::to_value(sts)?;
    if let Some(annotations) = value
        .pointer_mut("/spec/template/metadata/annotations")
        .and_then(Value::as_object_mut)
    {
        annotations.remove(TEMPLATE_HASH);
    }
    prune(&mut value);

    let mut out = Vec::new();
    write_canonical(&value, &mut out)?;
    Ok(out)
}

/// Reject templates with required fields left unset; they must never be fingerprinted.
fn validate(sts: &StatefulSet) -> Result<()> {
    if sts.metadata.name.as_deref().is_none_or(str::is_empty) {
        return Err(TetherError::IncompleteTemplate(
            "workload has no name".to_string(),
        ));
    }

    let pod_spec = sts
        .spec
        .as_ref()
        .and_then(|s| s.template.spec.as_ref())
        .ok_or_else(|| TetherError::IncompleteTemplate("workload has no pod spec".to_string()))?;

    if pod_spec.containers.is_empty() {
        return Err(TetherError::IncompleteTemplate(
            "pod spec has no containers".to_string(),
        ));
    }

    if let Some(container) = pod_spec
        .containers
        .iter()
        .find(|c| c.image.as_deref().is_none_or(str::is_empty))
    {
        return Err(TetherError::IncompleteTemplate(format!(
            "container {} has no image",
            container.name
        )));
    }

    Ok(())
}

/// Drop values equivalent to absence. Returns true when `value` itself should be dropped.
fn prune(value: &mut Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => {
            for item in items.iter_mut() {
                prune(item);
            }
            items.is_empty()
        }
        Value::Object(map) => {
            map.retain(|key, field| {
                let drop = prune(field);
                let empty_object = EMPTY_AS_ABSENT.contains(&key.as_str())
                    && field.as_object().is_some_and(|m| m.is_empty());
                !drop && !empty_object
            });
            false
        }
        _ => false,
    }
}

/// Keys are sorted here rather than relying on serde_json's map ordering, which
/// changes when any crate in the build enables `preserve_order`.
fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                write_canonical(&map[key], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}
