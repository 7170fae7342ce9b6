use std::collections::BTreeMap;

use resources::objects::{
    instance::{
        Instance, InstanceConditionStatus, InstanceConditionType, InstanceContainerStatus,
        InstancePhase,
    },
    pod::{ContainerState, ContainerStatus, PodCondition, PodConditionType, PodPhase, PodStatus},
};
use strum::IntoEnumIterator;

/// Pod phase for an instance phase. Anything unknown, or no phase at all, is `Unknown`.
pub fn pod_phase(phase: Option<&InstancePhase>) -> PodPhase {
    match phase {
        Some(InstancePhase::Scheduling) | Some(InstancePhase::Starting) => PodPhase::Pending,
        Some(InstancePhase::Running) => PodPhase::Running,
        Some(InstancePhase::Completed) | Some(InstancePhase::Stopped) => PodPhase::Succeeded,
        Some(InstancePhase::Failed) => PodPhase::Failed,
        Some(InstancePhase::Unrecognized) | None => PodPhase::Unknown,
    }
}

/// Pod status reported for the pod backed by `instance`.
///
/// `host_ip` is the address of the virtual node itself,
/// the instance does not run on a host the cluster knows about.
pub fn pod_status(instance: &Instance, host_ip: Option<&str>) -> PodStatus {
    let phase = pod_phase(instance.phase.as_ref());

    let mut conditions = PodConditionType::iter()
        .map(|type_| (type_, PodCondition::default()))
        .collect::<BTreeMap<_, _>>();
    if phase != PodPhase::Unknown {
        for type_ in [PodConditionType::PodScheduled, PodConditionType::Initialized] {
            if let Some(condition) = conditions.get_mut(&type_) {
                condition.status = true;
                condition.last_transition_time = instance.started_at;
            }
        }
    }
    if let Some(ready) = instance
        .conditions
        .iter()
        .find(|c| c.type_ == InstanceConditionType::Ready)
    {
        let status = ready.status == InstanceConditionStatus::True;
        for type_ in [PodConditionType::Ready, PodConditionType::ContainersReady] {
            conditions.insert(
                type_,
                PodCondition {
                    status,
                    last_transition_time: ready.last_transition_time,
                },
            );
        }
    }

    let container_statuses = instance
        .container_statuses
        .iter()
        .map(|status| container_status(instance, status))
        .collect();

    PodStatus {
        host_ip: host_ip.map(str::to_owned),
        start_time: instance.started_at,
        phase,
        reason: instance.reason.to_owned(),
        message: instance.message.to_owned(),
        pod_ip: instance.ip_address.to_owned(),
        conditions,
        container_statuses,
    }
}

fn container_status(instance: &Instance, status: &InstanceContainerStatus) -> ContainerStatus {
    let state = if let Some(terminated) = &status.terminated {
        ContainerState::Terminated {
            exit_code: terminated.exit_code,
            reason: terminated.reason.to_owned(),
            message: terminated.message.to_owned(),
            started_at: terminated.started_at,
            finished_at: terminated.finished_at,
        }
    } else if let Some(running) = &status.running {
        ContainerState::Running {
            started_at: running.started_at,
        }
    } else {
        let waiting = status.waiting.to_owned().unwrap_or_default();
        ContainerState::Waiting {
            reason: waiting.reason,
            message: waiting.message,
        }
    };
    let ready = matches!(state, ContainerState::Running { .. });

    ContainerStatus {
        name: status.name.to_owned(),
        image: instance
            .containers
            .get(&status.name)
            .map(|c| c.image.to_owned())
            .unwrap_or_default(),
        container_id: status.container_id.to_owned(),
        state,
        ready,
        restart_count: status.restart_count,
    }
}
