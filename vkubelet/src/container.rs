use std::collections::{BTreeMap, BTreeSet};

use resources::objects::{
    pod::{Container, ContainerPort, EnvVar, VolumeMount},
    workload::{
        ContainerSpec, EnvironmentVariable, InstancePort, InstanceVolumeMount, PortProtocol, Probe,
    },
};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    probe::{self, ProbeKind},
    resource_class::ResourceClassSelector,
    Error, Result,
};

/// Injected into every pod by the API server, the platform has no use for it.
pub const SERVICE_ACCOUNT_MOUNT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
/// Port name used when the container leaves it empty.
pub const DEFAULT_PORT_NAME: &str = "default";

/// Maps a pod container onto a workload container.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpecMapper {
    ignored_env_vars: BTreeSet<String>,
    resource_classes: ResourceClassSelector,
}

impl ContainerSpecMapper {
    pub fn new<I, S>(ignored_env_vars: I, resource_classes: ResourceClassSelector) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_env_vars: ignored_env_vars.into_iter().map(Into::into).collect(),
            resource_classes,
        }
    }

    pub fn map(&self, container: &Container, diagnostics: &mut Diagnostics) -> Result<ContainerSpec> {
        let command = command(container)?;

        let liveness_probe = self.probe(container, ProbeKind::Liveness, diagnostics)?;
        let readiness_probe = self.probe(container, ProbeKind::Readiness, diagnostics)?;

        Ok(ContainerSpec {
            image: container.image.to_owned(),
            command,
            ports: ports(&container.ports),
            env: self.env(&container.name, &container.env, diagnostics),
            resources: self.resource_classes.resources(&container.resources),
            volume_mounts: volume_mounts(&container.volume_mounts),
            liveness_probe,
            readiness_probe,
        })
    }

    fn probe(
        &self,
        container: &Container,
        kind: ProbeKind,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Probe>> {
        let source = match kind {
            ProbeKind::Liveness => container.liveness_probe.as_ref(),
            ProbeKind::Readiness => container.readiness_probe.as_ref(),
        };
        probe::translate(&container.name, kind, source, &container.ports, diagnostics).map_err(
            |error| Error::Probe {
                container: container.name.to_owned(),
                kind,
                error: Box::new(error),
            },
        )
    }

    fn env(
        &self,
        container: &str,
        vars: &[EnvVar],
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<String, EnvironmentVariable> {
        let mut env = BTreeMap::new();
        for var in vars {
            if self.ignored_env_vars.contains(&var.name) {
                continue;
            }
            if var.value_from.is_some() {
                diagnostics.push(Diagnostic::EnvVarFromSource {
                    container: container.to_owned(),
                    name: var.name.to_owned(),
                });
                continue;
            }
            env.insert(
                var.name.to_owned(),
                EnvironmentVariable {
                    value: var.value.to_owned().unwrap_or_default(),
                },
            );
        }
        env
    }
}

/// The platform takes a single vector, entrypoint first.
fn command(container: &Container) -> Result<Vec<String>> {
    if container.command.is_empty() {
        if !container.args.is_empty() {
            return Err(Error::ArgsWithoutCommand {
                container: container.name.to_owned(),
            });
        }
        return Ok(Vec::new());
    }
    Ok(container
        .command
        .iter()
        .chain(container.args.iter())
        .cloned()
        .collect())
}

fn ports(ports: &[ContainerPort]) -> BTreeMap<String, InstancePort> {
    ports
        .iter()
        .map(|p| {
            let name = if p.name.is_empty() {
                DEFAULT_PORT_NAME.to_owned()
            } else {
                p.name.to_owned()
            };
            let protocol = match p.protocol.as_deref() {
                Some("UDP") => PortProtocol::Udp,
                _ => PortProtocol::Tcp,
            };
            (
                name,
                InstancePort {
                    port: p.container_port,
                    protocol,
                },
            )
        })
        .collect()
}

fn volume_mounts(mounts: &[VolumeMount]) -> Vec<InstanceVolumeMount> {
    mounts
        .iter()
        .filter(|m| m.mount_path != SERVICE_ACCOUNT_MOUNT_PATH)
        .map(|m| InstanceVolumeMount {
            slug: m.name.to_owned(),
            mount_path: m.mount_path.to_owned(),
        })
        .collect()
}
