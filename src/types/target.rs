// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kinds of objects Tether mutates, dispatched on the API kind string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    /// Carries the ownership marker label
    Namespace,
    /// Carries the template fingerprint annotation
    Workload,
}

impl TargetKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Namespace" => Some(TargetKind::Namespace),
            "StatefulSet" => Some(TargetKind::Workload),
            _ => None,
        }
    }

    pub fn has_ownership_marker(&self) -> bool {
        matches!(self, TargetKind::Namespace)
    }

    pub fn has_template_annotation(&self) -> bool {
        matches!(self, TargetKind::Workload)
    }
}
