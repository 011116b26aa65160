// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ownership marker delta computation

use crate::labels::selector;
use crate::types::AgentStack;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// A single change to one label key
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelOp {
    Add { key: String, value: String },
    Replace { key: String, value: String },
    Remove { key: String },
}

/// Ordered label changes for one object. An empty delta means nothing to write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelDelta {
    ops: Vec<LabelOp>,
}

impl From<Vec<LabelOp>> for LabelDelta {
    fn from(ops: Vec<LabelOp>) -> Self {
        Self { ops }
    }
}

impl LabelDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[LabelOp] {
        &self.ops
    }

    fn push(mut self, op: LabelOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Apply the delta to an in-memory label map
    pub fn apply(&self, labels: &mut BTreeMap<String, String>) {
        for op in &self.ops {
            match op {
                LabelOp::Add { key, value } | LabelOp::Replace { key, value } => {
                    labels.insert(key.clone(), value.clone());
                }
                LabelOp::Remove { key } => {
                    labels.remove(key);
                }
            }
        }
    }
}

/// Pick the stack that owns an object with these labels.
///
/// When several stacks match, the one with the lexicographically smallest name wins.
pub fn select_owner<'a>(
    labels: &BTreeMap<String, String>,
    candidates: &'a [AgentStack],
) -> Option<&'a AgentStack> {
    candidates
        .iter()
        .filter(|stack| selector::matches(labels, stack.spec.namespace_selector.as_ref()))
        .min_by(|a, b| a.name_any().cmp(&b.name_any()))
}

/// Compute the change to `marker_key` that makes it name the current owner.
///
/// Labels other than `marker_key` are never part of the delta. The operator's own
/// namespace (`target_identity == self_identity`) always gets an empty delta.
pub fn compute_delta(
    current: &BTreeMap<String, String>,
    candidates: &[AgentStack],
    marker_key: &str,
    self_identity: &str,
    target_identity: &str,
) -> LabelDelta {
    if target_identity == self_identity {
        return LabelDelta::empty();
    }

    let owner = select_owner(current, candidates).map(|stack| stack.name_any());
    let marker = current.get(marker_key);

    match (owner, marker) {
        (Some(owner), Some(existing)) if *existing == owner => LabelDelta::empty(),
        (Some(owner), Some(_)) => LabelDelta::empty().push(LabelOp::Replace {
            key: marker_key.to_string(),
            value: owner,
        }),
        (Some(owner), None) => LabelDelta::empty().push(LabelOp::Add {
            key: marker_key.to_string(),
            value: owner,
        }),
        (None, Some(_)) => LabelDelta::empty().push(LabelOp::Remove {
            key: marker_key.to_string(),
        }),
        (None, None) => LabelDelta::empty(),
    }
}
