// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Template fingerprints and the annotation that stores them

use crate::constants::annotations::TEMPLATE_HASH;
use crate::error::Result;
use crate::template::canonical::canonicalize;
use k8s_openapi::api::apps::v1::StatefulSet;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`, always 64 characters
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fingerprint of a StatefulSet's canonical form
pub fn template_fingerprint(sts: &StatefulSet) -> Result<String> {
    Ok(fingerprint(&canonicalize(sts)?))
}

/// Compute the fingerprint and store it on the pod template metadata
pub fn stamp_fingerprint(sts: &mut StatefulSet) -> Result<String> {
    let hash = template_fingerprint(sts)?;

    if let Some(spec) = sts.spec.as_mut() {
        spec.template
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(Default::default)
            .insert(TEMPLATE_HASH.to_string(), hash.clone());
    }

    Ok(hash)
}

/// The fingerprint recorded on a live StatefulSet, if any
pub fn stored_fingerprint(sts: &StatefulSet) -> Option<&str> {
    sts.spec
        .as_ref()
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.annotations.as_ref())
        .and_then(|a| a.get(TEMPLATE_HASH))
        .map(String::as_str)
}
