// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generated workload templates and change detection.

pub mod canonical;
pub mod drift;
pub mod fingerprint;
pub mod statefulset;

pub use canonical::canonicalize;
pub use drift::{detect, needs_update, Drift};
pub use fingerprint::{fingerprint, stamp_fingerprint, stored_fingerprint, template_fingerprint};
pub use statefulset::{build_statefulset, StatefulSetProperties};
