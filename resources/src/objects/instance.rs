use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::workload::{ContainerSpec, WorkloadMetadata};

/// A running realization of a workload at one location,
/// as returned by the compute API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: Option<String>,
    pub name: String,
    pub metadata: Option<WorkloadMetadata>,
    /// Lifecycle phase. Absent while the platform has not reported one yet.
    pub phase: Option<InstancePhase>,
    /// A human readable explanation of the current phase.
    pub message: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "ipAddress")]
    pub ip_address: Option<String>,
    #[serde(rename = "ipv6Address")]
    pub ipv6_address: Option<String>,
    /// Public address when one to one NAT is enabled.
    #[serde(rename = "externalIpAddress")]
    pub external_ip_address: Option<String>,
    #[serde(default)]
    pub containers: BTreeMap<String, ContainerSpec>,
    #[serde(default)]
    pub container_statuses: Vec<InstanceContainerStatus>,
    #[serde(default)]
    pub conditions: Vec<InstanceCondition>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum InstancePhase {
    Scheduling,
    Starting,
    Running,
    Completed,
    Stopped,
    Failed,
    /// Any value this client does not know about.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceContainerStatus {
    pub name: String,
    pub container_id: Option<String>,
    #[serde(default)]
    pub restart_count: i32,
    pub waiting: Option<ContainerStatusWaiting>,
    pub running: Option<ContainerStatusRunning>,
    pub terminated: Option<ContainerStatusTerminated>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ContainerStatusWaiting {
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatusRunning {
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatusTerminated {
    #[serde(default)]
    pub exit_code: i32,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceCondition {
    #[serde(rename = "type")]
    pub type_: InstanceConditionType,
    pub status: InstanceConditionStatus,
    pub last_transition_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceConditionType {
    Ready,
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceConditionStatus {
    True,
    False,
    #[serde(other)]
    Unknown,
}
