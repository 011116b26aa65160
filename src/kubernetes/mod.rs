// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, namespace sync, and workload apply.

pub mod agent_stacks;
pub mod crd;
pub mod namespaces;
pub mod secrets;
pub mod statefulsets;

pub use agent_stacks::list_agent_stacks;
pub use crd::wait_for_agent_stack_crd;
pub use namespaces::{cluster_id, sync_namespace_labels};
pub use secrets::{apply_secret, build_custom_properties_secret};
pub use statefulsets::{apply_statefulset, delete_statefulset, WorkloadOutcome};
