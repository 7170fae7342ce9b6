use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Metadata;

/// Type of secrets holding a serialized `~/.docker/config.json`.
pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";
/// Key under which a docker config secret stores its document.
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Secret {
    pub metadata: Metadata,
    /// Used to facilitate programmatic handling of secret data.
    #[serde(rename = "type", default)]
    pub type_: String,
    /// Secret payload, already decoded by the client that fetched it.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Secret {
    pub fn docker_config_json(&self) -> Option<&str> {
        self.data.get(DOCKER_CONFIG_JSON_KEY).map(String::as_str)
    }
}

/// The `.dockerconfigjson` document.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: BTreeMap<String, DockerAuth>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DockerAuth {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}
