use std::{collections::BTreeMap, sync::Arc};

use resources::{
    config::provider::ProviderConfig,
    objects::{
        pod::Pod,
        workload::{
            DeploymentSpec, IpFamily, MatchExpression, NetworkInterface, Target, TargetSpec,
            Workload, WorkloadMetadata, WorkloadSpec,
        },
        Labels, Object,
    },
};

use crate::{
    container::ContainerSpecMapper,
    credentials::{self, SecretLister},
    diagnostics::Diagnostics,
    names::NameDeriver,
    resource_class::ResourceClassSelector,
    volume::VolumeClaimTranslator,
    Result,
};

pub const POD_NAME_LABEL: &str = "virtual-kubelet/pod-name";
pub const POD_NAMESPACE_LABEL: &str = "virtual-kubelet/pod-namespace";
pub const NODE_NAME_LABEL: &str = "virtual-kubelet/node-name";

pub const DEFAULT_NETWORK: &str = "default";
/// Instance label the platform places instances by.
pub const DEPLOYMENT_SCOPE: &str = "cityCode";

/// A workload request and what had to be left out to build it.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub workload: Workload,
    pub diagnostics: Diagnostics,
}

/// Builds compute API workload requests out of pods.
pub struct PodTranslator {
    config: ProviderConfig,
    names: NameDeriver,
    containers: ContainerSpecMapper,
    volumes: VolumeClaimTranslator,
    secrets: Option<Arc<dyn SecretLister>>,
}

impl PodTranslator {
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_resource_classes(config, ResourceClassSelector::default())
    }

    pub fn with_resource_classes(
        config: ProviderConfig,
        resource_classes: ResourceClassSelector,
    ) -> Self {
        Self {
            names: NameDeriver::from_config(&config),
            containers: ContainerSpecMapper::new(&config.ignored_env_vars, resource_classes),
            volumes: VolumeClaimTranslator::new(&config.csi_driver),
            secrets: None,
            config,
        }
    }

    /// Image pull secrets are only resolved when a lister is set.
    pub fn with_secrets(mut self, secrets: Arc<dyn SecretLister>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn names(&self) -> &NameDeriver {
        &self.names
    }

    /// Translate a pod into a single instance workload.
    ///
    /// The first container or volume that cannot be translated fails the pod,
    /// nothing partial is returned.
    pub fn translate(&self, pod: &Pod) -> Result<Translation> {
        let namespace = &pod.metadata.namespace;
        tracing::info!("Translating {} {}/{}", pod.kind(), namespace, pod.name());

        let mut diagnostics = Diagnostics::new();
        let mut containers = BTreeMap::new();
        for container in pod.spec.containers.iter() {
            let spec = self.containers.map(container, &mut diagnostics)?;
            containers.insert(container.name.to_owned(), spec);
        }
        let volume_claim_templates = self
            .volumes
            .translate_all(&pod.spec.volumes, &mut diagnostics)?;
        let image_pull_credentials = match &self.secrets {
            Some(lister) => credentials::image_pull_credentials(
                lister.as_ref(),
                namespace,
                &pod.spec.image_pull_secrets,
                &mut diagnostics,
            ),
            None => Vec::new(),
        };

        let workload = Workload {
            name: self.names.workload_name(namespace, pod.name()),
            slug: self.names.workload_slug(namespace, pod.name()),
            metadata: WorkloadMetadata {
                labels: self.labels(pod),
            },
            spec: WorkloadSpec {
                containers,
                network_interfaces: vec![network_interface()],
                image_pull_credentials,
                volume_claim_templates,
            },
            targets: BTreeMap::from([(self.config.target_name.to_owned(), self.target())]),
        };
        tracing::debug!(
            "Translated pod {}/{} into workload {} with {} diagnostics",
            namespace,
            pod.name(),
            workload.slug,
            diagnostics.len()
        );

        Ok(Translation {
            workload,
            diagnostics,
        })
    }

    fn labels(&self, pod: &Pod) -> Labels {
        Labels::from([
            (POD_NAME_LABEL.to_owned(), pod.metadata.name.to_owned()),
            (
                POD_NAMESPACE_LABEL.to_owned(),
                pod.metadata.namespace.to_owned(),
            ),
            (NODE_NAME_LABEL.to_owned(), self.config.node_name.to_owned()),
        ])
    }

    /// Exactly one instance, in the configured city.
    fn target(&self) -> Target {
        Target {
            spec: TargetSpec {
                deployment_scope: DEPLOYMENT_SCOPE.to_owned(),
                deployments: DeploymentSpec {
                    min_replicas: 1,
                    max_replicas: 1,
                    selectors: vec![MatchExpression {
                        key: DEPLOYMENT_SCOPE.to_owned(),
                        operator: "in".to_owned(),
                        values: vec![self.config.api.city_code.to_owned()],
                    }],
                },
            },
        }
    }
}

fn network_interface() -> NetworkInterface {
    NetworkInterface {
        network: DEFAULT_NETWORK.to_owned(),
        ip_families: vec![IpFamily::Ipv4],
        subnet: String::new(),
        ipv6_subnet: String::new(),
        enable_one_to_one_nat: true,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use resources::objects::{
        pod::{
            Container, ContainerPort, CsiVolumeSource, IntOrString, LocalObjectReference, PodSpec,
            Probe, TcpSocketAction, Volume,
        },
        workload::StringMap,
        secret::{Secret, DOCKER_CONFIG_JSON_KEY, DOCKER_CONFIG_JSON_TYPE},
        Metadata,
    };

    use super::*;
    use crate::{diagnostics::Diagnostic, Error};

    fn config() -> ProviderConfig {
        let mut config = ProviderConfig::default();
        config.api.city_code = "JFK".to_string();
        config
    }

    fn pod(containers: Vec<Container>) -> Pod {
        Pod {
            metadata: Metadata {
                name: "web".to_string(),
                namespace: "shop".to_string(),
                ..Default::default()
            },
            spec: PodSpec {
                containers,
                ..Default::default()
            },
            status: None,
        }
    }

    fn container(name: &str) -> Container {
        Container {
            name: name.to_string(),
            image: format!("{}:latest", name),
            ..Default::default()
        }
    }

    #[test]
    fn single_target_single_replica() {
        let translation = PodTranslator::new(config())
            .translate(&pod(vec![container("app")]))
            .unwrap();
        let workload = translation.workload;
        assert_eq!(workload.name, "shop-web");
        assert_eq!(workload.slug, "shop-web");
        assert_eq!(workload.targets.len(), 1);

        let target = &workload.targets["default"].spec;
        assert_eq!(target.deployment_scope, "cityCode");
        assert_eq!(target.deployments.min_replicas, 1);
        assert_eq!(target.deployments.max_replicas, 1);
        assert_eq!(
            target.deployments.selectors,
            vec![MatchExpression {
                key: "cityCode".to_string(),
                operator: "in".to_string(),
                values: vec!["JFK".to_string()],
            }]
        );

        let resources = &workload.spec.containers["app"].resources;
        let smallest = StringMap::from([
            ("cpu".to_string(), "1".to_string()),
            ("memory".to_string(), "2Gi".to_string()),
        ]);
        assert_eq!(resources.requests, smallest);
        assert_eq!(resources.limits, smallest);
    }

    #[test]
    fn one_ipv4_interface_with_nat() {
        let workload = PodTranslator::new(config())
            .translate(&pod(vec![container("app")]))
            .unwrap()
            .workload;
        assert_eq!(workload.spec.network_interfaces, vec![network_interface()]);
        let interface = &workload.spec.network_interfaces[0];
        assert_eq!(interface.network, "default");
        assert_eq!(interface.ip_families, vec![IpFamily::Ipv4]);
        assert!(interface.enable_one_to_one_nat);
    }

    #[test]
    fn labels_identify_pod_and_node() {
        let workload = PodTranslator::new(config())
            .translate(&pod(vec![container("app")]))
            .unwrap()
            .workload;
        let labels = &workload.metadata.labels;
        assert_eq!(labels[POD_NAME_LABEL], "web");
        assert_eq!(labels[POD_NAMESPACE_LABEL], "shop");
        assert_eq!(labels[NODE_NAME_LABEL], "vk-provider");
    }

    #[test]
    fn every_container_is_mapped() {
        let workload = PodTranslator::new(config())
            .translate(&pod(vec![container("app"), container("sidecar")]))
            .unwrap()
            .workload;
        assert_eq!(
            workload
                .spec
                .containers
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec!["app", "sidecar"]
        );
        assert_eq!(workload.spec.containers["sidecar"].image, "sidecar:latest");
    }

    #[test]
    fn container_failure_fails_the_pod() {
        let mut broken = container("sidecar");
        broken.ports = vec![ContainerPort {
            name: "http".to_string(),
            container_port: 80,
            protocol: None,
        }];
        broken.liveness_probe = Some(Probe {
            tcp_socket: Some(TcpSocketAction {
                port: IntOrString::String("admin".to_string()),
                host: None,
            }),
            ..Default::default()
        });
        let err = PodTranslator::new(config())
            .translate(&pod(vec![container("app"), broken]))
            .unwrap_err();
        assert!(matches!(err, Error::Probe { ref container, .. } if container == "sidecar"));
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn volumes_and_diagnostics() {
        let mut pod = pod(vec![container("app")]);
        pod.spec.volumes = vec![Volume {
            name: "data".to_string(),
            csi: Some(CsiVolumeSource {
                driver: config().csi_driver,
                read_only: false,
                volume_attributes: BTreeMap::from([("size".to_string(), "5000Gi".to_string())]),
            }),
            ..Default::default()
        }];
        let translation = PodTranslator::new(config()).translate(&pod).unwrap();
        let claims = &translation.workload.spec.volume_claim_templates;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].storage(), Some("1000Gi"));
        assert!(matches!(
            translation.diagnostics.iter().next(),
            Some(Diagnostic::VolumeSizeClamped { .. })
        ));
    }

    #[test]
    fn pull_secrets_need_a_lister() {
        let mut pod = pod(vec![container("app")]);
        pod.spec.image_pull_secrets = vec![LocalObjectReference {
            name: "registry".to_string(),
        }];

        let translation = PodTranslator::new(config()).translate(&pod).unwrap();
        assert!(translation.workload.spec.image_pull_credentials.is_empty());
        assert!(translation.diagnostics.is_empty());

        let secrets = vec![Secret {
            metadata: Metadata {
                name: "registry".to_string(),
                namespace: "shop".to_string(),
                ..Default::default()
            },
            type_: DOCKER_CONFIG_JSON_TYPE.to_string(),
            data: BTreeMap::from([(
                DOCKER_CONFIG_JSON_KEY.to_string(),
                r#"{"auths": {"docker.io": {"username": "u", "password": "p"}}}"#.to_string(),
            )]),
        }];
        let translation = PodTranslator::new(config())
            .with_secrets(Arc::new(secrets))
            .translate(&pod)
            .unwrap();
        let credentials = &translation.workload.spec.image_pull_credentials;
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].docker_registry.server, "docker.io");
    }

    #[test]
    fn translation_is_deterministic() {
        let translator = PodTranslator::new(config());
        let pod = pod(vec![container("b"), container("a")]);
        assert_eq!(
            translator.translate(&pod).unwrap(),
            translator.translate(&pod).unwrap()
        );
    }
}
