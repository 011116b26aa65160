// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Result of comparing a stored fingerprint with a fresh one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drift {
    Unchanged,
    /// Nothing stored yet, or the stored fingerprint differs
    Changed,
}

pub fn detect(stored: Option<&str>, fresh: &str) -> Drift {
    if stored == Some(fresh) {
        Drift::Unchanged
    } else {
        Drift::Changed
    }
}

/// Whether a workload must be rewritten
pub fn needs_update(stored: Option<&str>, fresh: &str) -> bool {
    detect(stored, fresh) == Drift::Changed
}
