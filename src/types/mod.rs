// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resources and object kinds handled by Tether.

pub mod agent_stack;
pub mod target;

pub use agent_stack::{
    AgentStack, AgentStackSpec, AgentStackStatus, Capability, CapabilityProperties, ValueSource,
};
pub use target::TargetKind;
