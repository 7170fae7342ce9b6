use serde::{Deserialize, Serialize};

use super::ApiConfig;

/// Variables the orchestrator injects into every container.
/// They point at the cluster API, which is unreachable from the remote platform.
pub const DEFAULT_IGNORED_ENV_VARS: [&str; 8] = [
    "KUBERNETES_PORT",
    "KUBERNETES_PORT_443_TCP",
    "KUBERNETES_PORT_443_TCP_ADDR",
    "KUBERNETES_PORT_443_TCP_PORT",
    "KUBERNETES_PORT_443_TCP_PROTO",
    "KUBERNETES_SERVICE_HOST",
    "KUBERNETES_SERVICE_PORT",
    "KUBERNETES_SERVICE_PORT_HTTPS",
];

/// CSI driver name of the volumes backed by remote block storage.
pub const DEFAULT_CSI_DRIVER: &str = "virtual-kubelet.storage.csi";

/// Keys are snake_case so that `VK_`-prefixed environment variables map onto them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Name of the virtual node the pods are scheduled onto.
    /// Defaults to "vk-provider".
    pub node_name: String,
    /// Address reported as the pods' host IP.
    pub internal_ip: Option<String>,
    /// Key of the single target every workload is deployed with.
    /// Defaults to "default".
    pub target_name: String,
    /// Only CSI volumes using this driver become volume claims.
    pub csi_driver: String,
    /// Environment variables never copied into a workload.
    /// Comma separated when set through `VK_IGNORED_ENV_VARS`.
    pub ignored_env_vars: Vec<String>,
    pub api: ApiConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            node_name: "vk-provider".to_string(),
            internal_ip: None,
            target_name: "default".to_string(),
            csi_driver: DEFAULT_CSI_DRIVER.to_string(),
            ignored_env_vars: DEFAULT_IGNORED_ENV_VARS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            api: ApiConfig::default(),
        }
    }
}
