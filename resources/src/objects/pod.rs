use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{quantity::Quantity, Metadata};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pod {
    pub metadata: Metadata,
    pub spec: PodSpec,
    pub status: Option<PodStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// List of containers belonging to the pod.
    /// Containers cannot currently be added or removed.
    /// There must be at least one container in a Pod. Cannot be updated.
    pub containers: Vec<Container>,
    /// List of volumes that can be mounted by containers belonging to the pod.
    #[serde(default)]
    pub volumes: Vec<Volume>,
    /// References to secrets in the same namespace
    /// to use for pulling any of the images used by this pod.
    #[serde(default)]
    pub image_pull_secrets: Vec<LocalObjectReference>,
    /// NodeName is a request to schedule this pod onto a specific node.
    pub node_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LocalObjectReference {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Name of the container specified as a DNS_LABEL.
    /// Each container in a pod must have a unique name (DNS_LABEL).
    /// Cannot be updated.
    pub name: String,
    /// Container image name.
    pub image: String,
    /// Entrypoint array. Not executed within a shell.
    /// The image's ENTRYPOINT is used if this is not provided.
    #[serde(default)]
    pub command: Vec<String>,
    /// Arguments to the entrypoint.
    /// The image's CMD is used if this is not provided.
    #[serde(default)]
    pub args: Vec<String>,
    /// List of ports to expose from the container.
    #[serde(default)]
    pub ports: Vec<ContainerPort>,
    /// List of environment variables to set in the container.
    #[serde(default)]
    pub env: Vec<EnvVar>,
    /// Compute Resources required by this container. Cannot be updated.
    #[serde(default)]
    pub resources: ResourceRequirements,
    /// Pod volumes to mount into the container's filesystem.
    /// Cannot be updated.
    #[serde(default)]
    pub volume_mounts: Vec<VolumeMount>,
    /// Periodic probe of container liveness.
    /// Container will be restarted if the probe fails.
    pub liveness_probe: Option<Probe>,
    /// Periodic probe of container service readiness.
    /// Container will be removed from service endpoints if the probe fails.
    pub readiness_probe: Option<Probe>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// If specified, this must be an IANA_SVC_NAME and unique within the pod.
    /// Each named port in a pod must have a unique name.
    /// Name for the port that can be referred to by services and probes.
    #[serde(default)]
    pub name: String,
    /// Number of port to expose on the pod's IP address.
    /// This must be a valid port number, 0 < x < 65536.
    pub container_port: i32,
    /// Protocol for port. Must be UDP, TCP, or SCTP.
    pub protocol: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Name of the environment variable. Must be a C_IDENTIFIER.
    pub name: String,
    /// Literal value, defaults to "".
    pub value: Option<String>,
    /// Source for the environment variable's value.
    /// Cannot be used if value is not empty.
    pub value_from: Option<EnvVarSource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    pub config_map_key_ref: Option<KeySelector>,
    pub secret_key_ref: Option<KeySelector>,
    pub field_ref: Option<ObjectFieldSelector>,
    pub resource_field_ref: Option<ResourceFieldSelector>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct KeySelector {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldSelector {
    pub field_path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFieldSelector {
    pub resource: String,
    pub container_name: Option<String>,
}

/// Resource name to amount, e.g. `cpu: 500m`, `memory: 2Gi`.
pub type ResourceList = BTreeMap<String, Quantity>;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ResourceRequirements {
    /// Requests describes the minimum amount of compute resources required.
    pub requests: Option<ResourceList>,
    /// Limits describes the maximum amount of compute resources allowed.
    pub limits: Option<ResourceList>,
}

impl ResourceRequirements {
    pub fn requested(&self, resource: &str) -> Option<Quantity> {
        self.requests.as_ref()?.get(resource).copied()
    }

    pub fn limit(&self, resource: &str) -> Option<Quantity> {
        self.limits.as_ref()?.get(resource).copied()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Path within the container at which the volume should be mounted.
    pub mount_path: String,
    /// This must match the Name of a Volume.
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume's name.
    /// Must be a DNS_LABEL and unique within the pod.
    pub name: String,
    /// HostPath represents a pre-existing file
    /// or directory on the host machine
    /// that is directly exposed to the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<HostPathVolumeSource>,
    /// EmptyDir represents a temporary directory that shares a pod's lifetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
    /// Storage handled by an external CSI driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csi: Option<CsiVolumeSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ObjectVolumeSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretVolumeSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<PersistentVolumeClaimVolumeSource>,
    /// Any other source, e.g. `projected` or `nfs`, kept as it came.
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl Volume {
    /// The source this volume is backed by.
    pub fn source(&self) -> VolumeSource<'_> {
        if let Some(csi) = &self.csi {
            VolumeSource::Csi(csi)
        } else if let Some(empty_dir) = &self.empty_dir {
            VolumeSource::EmptyDir(empty_dir)
        } else if let Some(host_path) = &self.host_path {
            VolumeSource::HostPath(host_path)
        } else if let Some(config_map) = &self.config_map {
            VolumeSource::ConfigMap(config_map)
        } else if let Some(secret) = &self.secret {
            VolumeSource::Secret(secret)
        } else if let Some(claim) = &self.persistent_volume_claim {
            VolumeSource::PersistentVolumeClaim(claim)
        } else {
            VolumeSource::Other(self.other.keys().next().map(String::as_str))
        }
    }
}

/// Borrowed view of the one source a volume is backed by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeSource<'a> {
    HostPath(&'a HostPathVolumeSource),
    EmptyDir(&'a EmptyDirVolumeSource),
    Csi(&'a CsiVolumeSource),
    ConfigMap(&'a ObjectVolumeSource),
    Secret(&'a SecretVolumeSource),
    PersistentVolumeClaim(&'a PersistentVolumeClaimVolumeSource),
    /// A source without a model here, by its field name. `None` if the volume has no source.
    Other(Option<&'a str>),
}

impl fmt::Display for VolumeSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match *self {
            VolumeSource::HostPath(_) => "hostPath",
            VolumeSource::EmptyDir(_) => "emptyDir",
            VolumeSource::Csi(_) => "csi",
            VolumeSource::ConfigMap(_) => "configMap",
            VolumeSource::Secret(_) => "secret",
            VolumeSource::PersistentVolumeClaim(_) => "persistentVolumeClaim",
            VolumeSource::Other(Some(kind)) => kind,
            VolumeSource::Other(None) => "no source",
        };
        f.write_str(kind)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct HostPathVolumeSource {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyDirVolumeSource {
    pub medium: Option<String>,
    pub size_limit: Option<Quantity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CsiVolumeSource {
    /// Name of the CSI driver that handles this volume.
    pub driver: String,
    #[serde(default)]
    pub read_only: bool,
    /// Driver-specific properties, e.g. `size: 10Gi`.
    #[serde(default)]
    pub volume_attributes: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ObjectVolumeSource {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    pub secret_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimVolumeSource {
    pub claim_name: String,
}

/// Either a port number or the name of a container port.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// Exec specifies the action to take.
    pub exec: Option<ExecAction>,
    /// GRPC specifies an action involving a GRPC port.
    pub grpc: Option<GrpcAction>,
    /// HTTPGet specifies the http request to perform.
    pub http_get: Option<HttpGetAction>,
    /// TCPSocket specifies an action involving a TCP port.
    pub tcp_socket: Option<TcpSocketAction>,
    /// Number of seconds after the container has started
    /// before liveness probes are initiated.
    pub initial_delay_seconds: Option<i32>,
    /// Number of seconds after which the probe times out.
    pub timeout_seconds: Option<i32>,
    /// How often (in seconds) to perform the probe.
    pub period_seconds: Option<i32>,
    /// Minimum consecutive successes for the probe
    /// to be considered successful after having failed.
    pub success_threshold: Option<i32>,
    /// Minimum consecutive failures for the probe
    /// to be considered failed after having succeeded.
    pub failure_threshold: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ExecAction {
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GrpcAction {
    pub port: i32,
    pub service: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Path to access on the HTTP server.
    #[serde(default)]
    pub path: String,
    /// Name or number of the port to access on the container.
    pub port: IntOrString,
    /// Host name to connect to, defaults to the pod IP.
    pub host: Option<String>,
    /// Scheme to use for connecting to the host. Defaults to HTTP.
    pub scheme: Option<String>,
    /// Custom headers to set in the request. HTTP allows repeated headers.
    #[serde(default)]
    pub http_headers: Vec<HttpHeader>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TcpSocketAction {
    /// Name or number of the port to access on the container.
    pub port: IntOrString,
    pub host: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    /// IP address of the host to which the pod is assigned.
    /// Empty if not yet scheduled.
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
    /// RFC 3339 date and time at which the object was acknowledged by the Kubelet.
    pub start_time: Option<DateTime<Utc>>,
    /// The phase of a Pod is a simple, high-level summary
    /// of where the Pod is in its lifecycle.
    pub phase: PodPhase,
    /// A brief CamelCase message indicating details
    /// about why the pod is in this state.
    pub reason: Option<String>,
    /// A human readable message indicating details
    /// about why the pod is in this condition.
    pub message: Option<String>,
    /// IP address allocated to the pod.
    /// Empty if not yet allocated.
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
    /// Current service state of pod.
    #[serde(default)]
    pub conditions: BTreeMap<PodConditionType, PodCondition>,
    /// The list has one entry per container in the manifest.
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, Default)]
pub enum PodPhase {
    /// All containers in the pod have terminated,
    /// and at least one container has terminated in failure.
    Failed,
    /// The pod has been accepted by the system,
    /// but one or more of the containers has not been set up and made ready to run.
    #[default]
    Pending,
    /// The pod has been bound to a node,
    /// and all of the containers have been created.
    /// At least one container is still running,
    /// or is in the process of starting or restarting.
    Running,
    /// All containers in the pod have terminated in success,
    /// and will not be restarted.
    Succeeded,
    /// For some reason the state of the pod could not be obtained.
    Unknown,
}

#[derive(
    Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Clone, Copy,
)]
pub enum PodConditionType {
    /// All containers in the pod are ready.
    ContainersReady,
    /// All init containers have completed successfully.
    Initialized,
    /// The pod has been scheduled to a node.
    PodScheduled,
    /// The pod is able to serve requests
    /// and should be added to the load balancing pools of all matching Services.
    Ready,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodCondition {
    /// Status is the status of the condition.
    pub status: bool,
    pub last_transition_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ContainerState {
    #[serde(rename_all = "camelCase")]
    Running { started_at: Option<DateTime<Utc>> },
    #[serde(rename_all = "camelCase")]
    Terminated {
        exit_code: i32,
        reason: Option<String>,
        message: Option<String>,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    },
    Waiting {
        reason: Option<String>,
        message: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    /// This must be a DNS_LABEL.
    /// Each container in a pod must have a unique name.
    pub name: String,
    /// The image the container is running.
    pub image: String,
    /// Container's ID
    pub container_id: Option<String>,
    /// State is the current state of the container.
    pub state: ContainerState,
    /// Specifies whether the container has passed its readiness probe.
    pub ready: bool,
    /// The number of times the container has been restarted.
    pub restart_count: i32,
}
