// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TetherError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Incomplete template: {0}")]
    IncompleteTemplate(String),

    #[error("Cluster identity unavailable: {0}")]
    ClusterIdentityError(String),

    #[error("Missing namespace on {0}")]
    MissingNamespace(String),
}

pub type Result<T> = std::result::Result<T, TetherError>;
