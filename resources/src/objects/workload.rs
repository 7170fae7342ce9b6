use std::{collections::BTreeMap, fmt::Write};

use indenter::indented;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::{write_labels, Labels};

/// String keyed map as used by the compute API for labels, resources and headers.
pub type StringMap = BTreeMap<String, String>;

/// A workload as accepted by the compute API's create call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub name: String,
    /// URL-safe identifier, unique within a stack.
    pub slug: String,
    pub metadata: WorkloadMetadata,
    pub spec: WorkloadSpec,
    /// Where and how many instances to run, keyed by target name.
    pub targets: BTreeMap<String, Target>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct WorkloadMetadata {
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSpec {
    /// Containers to run in every instance, keyed by container name.
    pub containers: BTreeMap<String, ContainerSpec>,
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_credentials: Vec<ImagePullCredential>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_claim_templates: Vec<VolumeClaim>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub image: String,
    /// Entrypoint followed by its arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default)]
    pub ports: BTreeMap<String, InstancePort>,
    #[serde(default)]
    pub env: BTreeMap<String, EnvironmentVariable>,
    #[serde(default)]
    pub resources: ResourceRequirements,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<InstanceVolumeMount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PortProtocol {
    Tcp,
    Udp,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstancePort {
    pub port: i32,
    pub protocol: PortProtocol,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EnvironmentVariable {
    pub value: String,
}

/// Compute or storage sizing, e.g. `{"cpu": "2", "memory": "4Gi"}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ResourceRequirements {
    pub requests: StringMap,
    pub limits: StringMap,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceVolumeMount {
    /// Slug of the volume claim to mount.
    pub slug: String,
    pub mount_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TcpSocketAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
}

/// Execute an HTTP GET request against an endpoint running on an instance.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// The path portion of the URL to request.
    pub path: String,
    /// The TCP port to query in the HTTP request.
    pub port: i32,
    /// HTTP scheme to use in the HTTP request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub http_headers: StringMap,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TcpSocketAction {
    pub port: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
pub enum IpFamily {
    #[serde(rename = "IPv4")]
    #[strum(serialize = "IPv4")]
    Ipv4,
    #[serde(rename = "IPv6")]
    #[strum(serialize = "IPv6")]
    Ipv6,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// Slug of the network to attach to.
    pub network: String,
    pub ip_families: Vec<IpFamily>,
    pub subnet: String,
    #[serde(rename = "ipv6Subnet")]
    pub ipv6_subnet: String,
    /// Give every instance a public address mapped one to one onto its private one.
    pub enable_one_to_one_nat: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePullCredential {
    pub docker_registry: DockerRegistryCredentials,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DockerRegistryCredentials {
    pub server: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct VolumeClaim {
    pub name: String,
    pub slug: String,
    pub metadata: WorkloadMetadata,
    pub spec: VolumeClaimSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct VolumeClaimSpec {
    #[serde(default)]
    pub resources: ResourceRequirements,
}

impl VolumeClaim {
    pub fn storage(&self) -> Option<&str> {
        self.spec
            .resources
            .requests
            .get("storage")
            .map(String::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Target {
    pub spec: TargetSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    /// Label key the deployment selectors place instances by.
    pub deployment_scope: String,
    pub deployments: DeploymentSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub min_replicas: i32,
    pub max_replicas: i32,
    pub selectors: Vec<MatchExpression>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchExpression {
    pub key: String,
    pub operator: String,
    pub values: Vec<String>,
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<16} {}", "Name:", self.name)?;
        writeln!(f, "{:<16} {}", "Slug:", self.slug)?;
        write!(f, "{:<16} ", "Labels:")?;
        write_labels(f, &self.metadata.labels)?;

        writeln!(f, "Containers:")?;
        for (name, container) in self.spec.containers.iter() {
            writeln!(indented(f), "{}:", name)?;
            write!(indented(f).with_str("        "), "{}", container)?;
        }

        if !self.spec.volume_claim_templates.is_empty() {
            writeln!(f, "Volumes:")?;
            for claim in self.spec.volume_claim_templates.iter() {
                writeln!(
                    indented(f),
                    "{}: {}",
                    claim.slug,
                    claim.storage().unwrap_or("<unset>")
                )?;
            }
        }

        writeln!(f, "Targets:")?;
        for (name, target) in self.targets.iter() {
            let deployments = &target.spec.deployments;
            let locations = deployments
                .selectors
                .iter()
                .map(|s| format!("{} {} {:?}", s.key, s.operator, s.values))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                indented(f),
                "{}: {}..{} replicas, {}",
                name,
                deployments.min_replicas,
                deployments.max_replicas,
                locations
            )?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ContainerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<12} {}", "Image:", self.image)?;
        if !self.command.is_empty() {
            writeln!(f, "{:<12} {}", "Command:", self.command.join(" "))?;
        }
        for (name, port) in self.ports.iter() {
            writeln!(f, "{:<12} {} {}/{}", "Port:", name, port.port, port.protocol)?;
        }
        writeln!(
            f,
            "{:<12} cpu={} memory={}",
            "Resources:",
            self.resources.limits.get("cpu").map_or("-", String::as_str),
            self.resources.limits.get("memory").map_or("-", String::as_str)
        )?;
        for mount in self.volume_mounts.iter() {
            writeln!(f, "{:<12} {} -> {}", "Mount:", mount.slug, mount.mount_path)?;
        }
        Ok(())
    }
}
