// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace ownership labels: selector matching, marker deltas and patches.

pub mod delta;
pub mod patch;
pub mod selector;

pub use delta::{compute_delta, select_owner, LabelDelta, LabelOp};
pub use patch::{emit, to_json_patch};
pub use selector::matches;
