// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secrets generated for AgentStack capabilities

use crate::constants::{custom_properties::DATA_KEY, OPERATOR_NAME};
use crate::error::{Result, TetherError};
use crate::template::statefulset::{custom_properties_secret_name, workload_labels};
use crate::types::{AgentStack, Capability};
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ObjectMeta, Patch, PatchParams},
    Api, Client, Resource, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Secret carrying a literal custom properties value for one capability
pub fn build_custom_properties_secret(
    stack: &AgentStack,
    capability: Capability,
    value: &str,
) -> Result<Secret> {
    let namespace = stack
        .namespace()
        .ok_or_else(|| TetherError::MissingNamespace(format!("AgentStack {}", stack.name_any())))?;

    Ok(Secret {
        metadata: ObjectMeta {
            name: Some(custom_properties_secret_name(stack, capability)),
            namespace: Some(namespace),
            labels: Some(workload_labels(stack, capability)),
            owner_references: stack.controller_owner_ref(&()).map(|o| vec![o]),
            ..Default::default()
        },
        string_data: Some(BTreeMap::from([(DATA_KEY.to_string(), value.to_string())])),
        ..Default::default()
    })
}

/// Server-side apply a secret in its own namespace
#[instrument(skip(client, secret), fields(name = %secret.name_any()))]
pub async fn apply_secret(client: &Client, secret: &Secret) -> Result<()> {
    let name = secret.name_any();
    let namespace = secret
        .namespace()
        .ok_or_else(|| TetherError::MissingNamespace(format!("Secret {}", name)))?;
    let api: Api<Secret> = Api::namespaced(client.clone(), &namespace);

    api.patch(
        &name,
        &PatchParams::apply(OPERATOR_NAME).force(),
        &Patch::Apply(secret),
    )
    .await?;

    info!("Applied secret {}/{}", namespace, name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::labels::FEATURE;
    use crate::test_utils::MockService;
    use crate::types::AgentStackSpec;

    fn make_stack(namespace: Option<&str>) -> AgentStack {
        AgentStack {
            metadata: ObjectMeta {
                name: Some("stack-a".to_string()),
                namespace: namespace.map(str::to_string),
                uid: Some("stack-uid".to_string()),
                ..Default::default()
            },
            spec: AgentStackSpec::default(),
            status: None,
        }
    }

    #[test]
    fn test_build_custom_properties_secret() {
        let stack = make_stack(Some("tether"));

        let secret =
            build_custom_properties_secret(&stack, Capability::KubernetesMonitoring, "a=b").unwrap();

        assert_eq!(
            secret.metadata.name.as_deref(),
            Some("stack-a-kubemon-custom-properties")
        );
        assert_eq!(secret.metadata.namespace.as_deref(), Some("tether"));
        assert_eq!(
            secret.string_data.unwrap().get(DATA_KEY).map(String::as_str),
            Some("a=b")
        );
        assert_eq!(
            secret.metadata.labels.unwrap().get(FEATURE).map(String::as_str),
            Some("kubemon")
        );
        let owners = secret.metadata.owner_references.unwrap();
        assert_eq!(owners[0].uid, "stack-uid");
        assert_eq!(owners[0].controller, Some(true));
    }

    #[test]
    fn test_build_secret_requires_namespace() {
        let result = build_custom_properties_secret(&make_stack(None), Capability::Routing, "a=b");

        assert!(matches!(result, Err(TetherError::MissingNamespace(_))));
    }

    #[tokio::test]
    async fn test_apply_secret() {
        let path = "/api/v1/namespaces/tether/secrets/stack-a-router-custom-properties";
        let secret =
            build_custom_properties_secret(&make_stack(Some("tether")), Capability::Routing, "a=b")
                .unwrap();
        let mock =
            MockService::new().on_patch(path, 200, &serde_json::to_string(&secret).unwrap());

        apply_secret(&mock.clone().into_client(), &secret).await.unwrap();

        assert!(mock.was_called("PATCH", path));
    }
}
