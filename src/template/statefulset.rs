// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! StatefulSet generation for AgentStack capabilities.
//!
//! Everything here is a pure function of its inputs: the same stack, capability,
//! cluster identifier and custom properties hash always yield the same template.

use crate::constants::{
    annotations, custom_properties, env, labels, AGENT_CONTAINER_NAME, DEFAULT_SERVICE_ACCOUNT,
    PULL_SECRET_SUFFIX,
};
use crate::error::{Result, TetherError};
use crate::template::fingerprint::stamp_fingerprint;
use crate::types::{AgentStack, Capability, CapabilityProperties};
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{
    Affinity, Container, EnvVar, EnvVarSource, HTTPGetAction, KeyToPath, LocalObjectReference,
    NodeAffinity, NodeSelector, NodeSelectorRequirement, NodeSelectorTerm, PodSpec,
    PodTemplateSpec, Probe, SecretKeySelector, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

const BETA_ARCH_LABEL: &str = "beta.kubernetes.io/arch";
const BETA_OS_LABEL: &str = "beta.kubernetes.io/os";
const ARCH_LABEL: &str = "kubernetes.io/arch";
const OS_LABEL: &str = "kubernetes.io/os";
const SUPPORTED_ARCHES: [&str; 2] = ["amd64", "arm64"];
const SUPPORTED_OS: &str = "linux";

const HEALTH_PATH: &str = "/rest/health";
const HEALTH_PORT: i32 = 9999;

/// Inputs for one capability's StatefulSet
#[derive(Clone, Debug)]
pub struct StatefulSetProperties<'a> {
    pub stack: &'a AgentStack,
    pub capability: Capability,
    pub properties: &'a CapabilityProperties,
    pub cluster_id: String,
    pub custom_properties_hash: String,
}

impl<'a> StatefulSetProperties<'a> {
    pub fn new(
        stack: &'a AgentStack,
        capability: Capability,
        properties: &'a CapabilityProperties,
        cluster_id: impl Into<String>,
        custom_properties_hash: impl Into<String>,
    ) -> Self {
        Self {
            stack,
            capability,
            properties,
            cluster_id: cluster_id.into(),
            custom_properties_hash: custom_properties_hash.into(),
        }
    }

    fn namespace(&self) -> String {
        self.stack.namespace().unwrap_or_default()
    }
}

/// Name of the StatefulSet generated for a capability
pub fn statefulset_name(stack: &AgentStack, capability: Capability) -> String {
    format!("{}-{}", stack.name_any(), capability.feature())
}

/// Name of the secret holding literal custom properties for a capability
pub fn custom_properties_secret_name(stack: &AgentStack, capability: Capability) -> String {
    format!(
        "{}-{}-{}",
        stack.name_any(),
        capability.feature(),
        custom_properties::SUFFIX
    )
}

/// Labels shared by every workload of a stack; also the StatefulSet selector
pub fn stack_labels(stack: &AgentStack) -> BTreeMap<String, String> {
    BTreeMap::from([
        (labels::APP_NAME.to_string(), labels::APP_NAME_VALUE.to_string()),
        (labels::STACK.to_string(), stack.name_any()),
    ])
}

/// Stack labels plus the capability feature label
pub fn workload_labels(stack: &AgentStack, capability: Capability) -> BTreeMap<String, String> {
    let mut workload = stack_labels(stack);
    workload.insert(labels::FEATURE.to_string(), capability.feature().to_string());
    workload
}

/// Build the StatefulSet for a capability, with its fingerprint annotation stamped.
pub fn build_statefulset(props: &StatefulSetProperties) -> Result<StatefulSet> {
    let stack = props.stack;
    let namespace = stack
        .namespace()
        .ok_or_else(|| TetherError::MissingNamespace(format!("AgentStack {}", stack.name_any())))?;
    let pod_labels = workload_labels(stack, props.capability);

    let mut sts = StatefulSet {
        metadata: ObjectMeta {
            name: Some(statefulset_name(stack, props.capability)),
            namespace: Some(namespace),
            labels: Some(pod_labels.clone()),
            owner_references: stack.controller_owner_ref(&()).map(|o| vec![o]),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(props.properties.replicas.unwrap_or(1)),
            pod_management_policy: Some("Parallel".to_string()),
            selector: LabelSelector {
                match_labels: Some(stack_labels(stack)),
                match_expressions: None,
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(pod_labels),
                    annotations: template_annotations(props),
                    ..Default::default()
                }),
                spec: Some(build_pod_spec(props)),
            },
            ..Default::default()
        }),
        status: None,
    };

    stamp_fingerprint(&mut sts)?;
    Ok(sts)
}

fn template_annotations(props: &StatefulSetProperties) -> Option<BTreeMap<String, String>> {
    let mut template = BTreeMap::new();
    if let Some(version) = props.stack.image_version() {
        template.insert(annotations::IMAGE_VERSION.to_string(), version.to_string());
    }
    if !props.custom_properties_hash.is_empty() {
        template.insert(
            annotations::CUSTOM_PROPERTIES_HASH.to_string(),
            props.custom_properties_hash.clone(),
        );
    }
    non_empty_map(template)
}

pub fn build_pod_spec(props: &StatefulSetProperties) -> PodSpec {
    let properties = props.properties;

    PodSpec {
        containers: vec![build_container(props)],
        node_selector: non_empty_map(properties.node_selector.clone()),
        service_account_name: Some(
            properties
                .service_account_name
                .clone()
                .filter(|sa| !sa.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT.to_string()),
        ),
        affinity: Some(build_affinity()),
        tolerations: non_empty_vec(properties.tolerations.clone()),
        volumes: non_empty_vec(build_volumes(props)),
        image_pull_secrets: Some(vec![LocalObjectReference {
            name: format!("{}{}", props.stack.name_any(), PULL_SECRET_SUFFIX),
        }]),
        ..Default::default()
    }
}

pub fn build_container(props: &StatefulSetProperties) -> Container {
    Container {
        name: AGENT_CONTAINER_NAME.to_string(),
        image: Some(props.stack.agent_image()),
        image_pull_policy: Some("Always".to_string()),
        resources: props.properties.resources.clone(),
        env: Some(build_envs(props)),
        volume_mounts: non_empty_vec(build_volume_mounts(props)),
        readiness_probe: Some(health_probe(30)),
        liveness_probe: Some(health_probe(90)),
        ..Default::default()
    }
}

fn health_probe(initial_delay_seconds: i32) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(HEALTH_PATH.to_string()),
            port: IntOrString::Int(HEALTH_PORT),
            scheme: Some("HTTPS".to_string()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay_seconds),
        period_seconds: Some(15),
        failure_threshold: Some(3),
        ..Default::default()
    }
}

fn build_affinity() -> Affinity {
    let term = |arch_label: &str, os_label: &str| NodeSelectorTerm {
        match_expressions: Some(vec![
            NodeSelectorRequirement {
                key: arch_label.to_string(),
                operator: "In".to_string(),
                values: Some(SUPPORTED_ARCHES.iter().map(|a| a.to_string()).collect()),
            },
            NodeSelectorRequirement {
                key: os_label.to_string(),
                operator: "In".to_string(),
                values: Some(vec![SUPPORTED_OS.to_string()]),
            },
        ]),
        match_fields: None,
    };

    Affinity {
        node_affinity: Some(NodeAffinity {
            required_during_scheduling_ignored_during_execution: Some(NodeSelector {
                node_selector_terms: vec![
                    term(BETA_ARCH_LABEL, BETA_OS_LABEL),
                    term(ARCH_LABEL, OS_LABEL),
                ],
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Agent environment. Order is part of the template and feeds the fingerprint.
pub fn build_envs(props: &StatefulSetProperties) -> Vec<EnvVar> {
    let spec = &props.stack.spec;
    let mut envs = vec![
        env_var(env::CAPABILITIES, props.capability.agent_name()),
        env_var(env::ID_SEED_NAMESPACE, &props.namespace()),
        env_var(env::ID_SEED_CLUSTER_ID, &props.cluster_id),
    ];

    if let Some(proxy) = &spec.proxy {
        if let Some(secret) = proxy.value_from.as_deref().filter(|s| !s.is_empty()) {
            envs.push(EnvVar {
                name: env::INTERNAL_PROXY.to_string(),
                value: None,
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: secret.to_string(),
                        key: env::PROXY_SECRET_KEY.to_string(),
                        optional: None,
                    }),
                    ..Default::default()
                }),
            });
        } else if let Some(value) = proxy.value.as_deref().filter(|v| !v.is_empty()) {
            envs.push(env_var(env::INTERNAL_PROXY, value));
        }
    }

    if let Some(zone) = spec.network_zone.as_deref().filter(|z| !z.is_empty()) {
        envs.push(env_var(env::NETWORK_ZONE, zone));
    }

    if let Some(group) = props.properties.group.as_deref().filter(|g| !g.is_empty()) {
        envs.push(env_var(env::GROUP, group));
    }

    envs.extend(props.properties.env.iter().cloned());
    envs
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

/// Secret backing the custom properties volume: the referenced one, or the
/// generated one when a literal value is configured
fn custom_properties_source(props: &StatefulSetProperties) -> Option<String> {
    let source = props.properties.custom_properties.as_ref()?;

    if let Some(secret) = source.value_from.as_deref().filter(|s| !s.is_empty()) {
        return Some(secret.to_string());
    }

    source
        .value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|_| custom_properties_secret_name(props.stack, props.capability))
}

pub fn build_volumes(props: &StatefulSetProperties) -> Vec<Volume> {
    custom_properties_source(props)
        .map(|secret_name| Volume {
            name: custom_properties::VOLUME_NAME.to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret_name),
                items: Some(vec![KeyToPath {
                    key: custom_properties::DATA_KEY.to_string(),
                    path: custom_properties::DATA_PATH.to_string(),
                    mode: None,
                }]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .into_iter()
        .collect()
}

pub fn build_volume_mounts(props: &StatefulSetProperties) -> Vec<VolumeMount> {
    custom_properties_source(props)
        .map(|_| VolumeMount {
            name: custom_properties::VOLUME_NAME.to_string(),
            mount_path: custom_properties::MOUNT_PATH.to_string(),
            sub_path: Some(custom_properties::DATA_PATH.to_string()),
            read_only: Some(true),
            ..Default::default()
        })
        .into_iter()
        .collect()
}

fn non_empty_map(map: BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then_some(map)
}

fn non_empty_vec<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
