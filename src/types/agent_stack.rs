// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements, Toleration};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "tether.geeko.me", version = "v1alpha1", kind = "AgentStack")]
#[kube(namespaced)]
#[kube(status = "AgentStackStatus")]
#[serde(rename_all = "camelCase")]
pub struct AgentStackSpec {
    /// Tenant API endpoint, also used to derive the default agent image
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Namespaces matching this selector are claimed by the stack.
    /// A missing or empty selector claims nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ValueSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<CapabilityProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_monitoring: Option<CapabilityProperties>,
}

/// A literal value or the name of a secret holding it
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValueSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProperties {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_properties: Option<ValueSource>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentStackStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_version: Option<String>,
}

/// A workload the operator can roll out for an AgentStack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Routing,
    KubernetesMonitoring,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Routing, Capability::KubernetesMonitoring];

    /// Suffix used in generated object names and the feature label
    pub fn feature(&self) -> &'static str {
        match self {
            Capability::Routing => "router",
            Capability::KubernetesMonitoring => "kubemon",
        }
    }

    /// Capability name understood by the agent
    pub fn agent_name(&self) -> &'static str {
        match self {
            Capability::Routing => "MSGrouter",
            Capability::KubernetesMonitoring => "kubernetes_monitoring",
        }
    }
}

impl AgentStack {
    pub fn capability(&self, capability: Capability) -> Option<&CapabilityProperties> {
        match capability {
            Capability::Routing => self.spec.routing.as_ref(),
            Capability::KubernetesMonitoring => self.spec.kubernetes_monitoring.as_ref(),
        }
    }

    /// Capability properties, only when the capability is switched on
    pub fn enabled_capability(&self, capability: Capability) -> Option<&CapabilityProperties> {
        self.capability(capability).filter(|c| c.enabled)
    }

    /// Agent image, falling back to the tenant registry derived from the API URL
    pub fn agent_image(&self) -> String {
        if let Some(image) = self.spec.image.as_deref().filter(|i| !i.is_empty()) {
            return image.to_string();
        }

        let host = self
            .spec
            .api_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or_default();
        format!("{}/linux/tether-agent:latest", host)
    }

    pub fn image_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.image_version.as_deref())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn make_stack(spec: AgentStackSpec, status: Option<AgentStackStatus>) -> AgentStack {
        AgentStack {
            metadata: ObjectMeta {
                name: Some("stack-a".to_string()),
                namespace: Some("tether".to_string()),
                ..Default::default()
            },
            spec,
            status,
        }
    }

    #[test]
    fn test_agent_image_explicit() {
        let stack = make_stack(
            AgentStackSpec {
                api_url: "https://tenant.example.com/api".to_string(),
                image: Some("registry.local/agent:1.2".to_string()),
                ..Default::default()
            },
            None,
        );

        assert_eq!(stack.agent_image(), "registry.local/agent:1.2");
    }

    #[test]
    fn test_agent_image_derived_from_api_url() {
        let stack = make_stack(
            AgentStackSpec {
                api_url: "https://tenant.example.com/api".to_string(),
                ..Default::default()
            },
            None,
        );

        assert_eq!(
            stack.agent_image(),
            "tenant.example.com/linux/tether-agent:latest"
        );
    }

    #[test]
    fn test_agent_image_empty_override_ignored() {
        let stack = make_stack(
            AgentStackSpec {
                api_url: "http://tenant.example.com".to_string(),
                image: Some(String::new()),
                ..Default::default()
            },
            None,
        );

        assert_eq!(
            stack.agent_image(),
            "tenant.example.com/linux/tether-agent:latest"
        );
    }

    #[test]
    fn test_enabled_capability() {
        let stack = make_stack(
            AgentStackSpec {
                routing: Some(CapabilityProperties {
                    enabled: true,
                    ..Default::default()
                }),
                kubernetes_monitoring: Some(CapabilityProperties::default()),
                ..Default::default()
            },
            None,
        );

        assert!(stack.enabled_capability(Capability::Routing).is_some());
        assert!(stack.capability(Capability::KubernetesMonitoring).is_some());
        assert!(stack
            .enabled_capability(Capability::KubernetesMonitoring)
            .is_none());
    }

    #[test]
    fn test_image_version() {
        let with_version = make_stack(
            AgentStackSpec::default(),
            Some(AgentStackStatus {
                image_version: Some("1.250.0".to_string()),
            }),
        );
        let empty_version = make_stack(
            AgentStackSpec::default(),
            Some(AgentStackStatus {
                image_version: Some(String::new()),
            }),
        );

        assert_eq!(with_version.image_version(), Some("1.250.0"));
        assert_eq!(empty_version.image_version(), None);
        assert_eq!(make_stack(AgentStackSpec::default(), None).image_version(), None);
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::Routing.feature(), "router");
        assert_eq!(Capability::Routing.agent_name(), "MSGrouter");
        assert_eq!(Capability::KubernetesMonitoring.feature(), "kubemon");
        assert_eq!(
            Capability::KubernetesMonitoring.agent_name(),
            "kubernetes_monitoring"
        );
    }

    #[test]
    fn test_spec_deserializes_camel_case() {
        let spec: AgentStackSpec = serde_json::from_value(serde_json::json!({
            "apiUrl": "https://tenant.example.com/api",
            "namespaceSelector": { "matchLabels": { "inject": "true" } },
            "networkZone": "zone-a",
            "routing": { "enabled": true, "replicas": 2 }
        }))
        .unwrap();

        assert_eq!(spec.network_zone.as_deref(), Some("zone-a"));
        assert_eq!(spec.routing.unwrap().replicas, Some(2));
        assert!(spec.namespace_selector.unwrap().match_labels.is_some());
    }
}
