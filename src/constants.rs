// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys written or read by Tether
pub mod labels {
    /// Ownership marker on namespaces: names the AgentStack that claims the namespace
    pub const INSTANCE: &str = "tether.geeko.me/instance";
    pub const APP_NAME: &str = "app.kubernetes.io/name";
    pub const APP_NAME_VALUE: &str = "tether-agent";
    pub const STACK: &str = "tether.geeko.me/stack";
    pub const FEATURE: &str = "tether.geeko.me/feature";
}

/// Annotation keys set on generated workloads
pub mod annotations {
    /// Fingerprint of the last applied template, stored on the pod template metadata
    pub const TEMPLATE_HASH: &str = "tether.geeko.me/template-hash";
    pub const IMAGE_VERSION: &str = "tether.geeko.me/image-version";
    pub const CUSTOM_PROPERTIES_HASH: &str = "tether.geeko.me/custom-properties-hash";
}

/// Environment variables injected into the agent container
pub mod env {
    pub const CAPABILITIES: &str = "AGENT_CAPABILITIES";
    pub const ID_SEED_NAMESPACE: &str = "AGENT_ID_SEED_NAMESPACE";
    pub const ID_SEED_CLUSTER_ID: &str = "AGENT_ID_SEED_CLUSTER_ID";
    pub const INTERNAL_PROXY: &str = "AGENT_INTERNAL_PROXY";
    pub const NETWORK_ZONE: &str = "AGENT_NETWORK_ZONE";
    pub const GROUP: &str = "AGENT_GROUP";
    /// Key inside a proxy secret holding the proxy URL
    pub const PROXY_SECRET_KEY: &str = "proxy";
}

/// Custom properties secret layout
pub mod custom_properties {
    pub const SUFFIX: &str = "custom-properties";
    pub const VOLUME_NAME: &str = "custom-properties";
    pub const DATA_KEY: &str = "customProperties";
    pub const DATA_PATH: &str = "custom.properties";
    pub const MOUNT_PATH: &str = "/var/lib/tether/gateway/config/custom.properties";
}

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "tether";

/// Name of the agent container in generated workloads
pub const AGENT_CONTAINER_NAME: &str = "tether-agent";

/// Service account used when a capability does not name one
pub const DEFAULT_SERVICE_ACCOUNT: &str = "tether-agent";

/// Suffix of the image pull secret generated per AgentStack
pub const PULL_SECRET_SUFFIX: &str = "-pull-secret";

/// Namespace whose UID identifies the cluster
pub const CLUSTER_ID_NAMESPACE: &str = "kube-system";

/// CRD polling configuration
pub mod crd {
    pub const GROUP: &str = "tether.geeko.me";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "AgentStack";
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
