// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;

const DEFAULT_WEBHOOK_PORT: u16 = 8443;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the operator runs in; AgentStacks are read from here and it is never labeled
    pub operator_namespace: String,
    pub webhook_port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let operator_namespace = env::var("OPERATOR_NAMESPACE")
            .context("OPERATOR_NAMESPACE environment variable not set")?;
        let webhook_port = match env::var("WEBHOOK_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("WEBHOOK_PORT is not a valid port: {}", port))?,
            Err(_) => DEFAULT_WEBHOOK_PORT,
        };

        Ok(Config {
            operator_namespace,
            webhook_port,
        })
    }
}
