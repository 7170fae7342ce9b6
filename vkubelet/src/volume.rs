use resources::objects::{
    pod::{self, CsiVolumeSource, VolumeSource},
    quantity::{Quantity, GI},
    workload::{ResourceRequirements, StringMap, VolumeClaim, VolumeClaimSpec, WorkloadMetadata},
};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    Error, Result,
};

/// Volume attribute holding the requested size, e.g. `size: 10Gi`.
pub const SIZE_ATTRIBUTE: &str = "size";
pub const DEFAULT_VOLUME_SIZE: Quantity = Quantity::binary(GI);
/// Largest volume the platform provisions.
pub const MAX_VOLUME_SIZE: Quantity = Quantity::binary(1000 * GI);

/// Turns pod volumes into workload volume claim templates.
#[derive(Debug, Clone)]
pub struct VolumeClaimTranslator {
    csi_driver: String,
}

impl VolumeClaimTranslator {
    pub fn new(csi_driver: impl Into<String>) -> Self {
        Self {
            csi_driver: csi_driver.into(),
        }
    }

    pub fn translate_all(
        &self,
        volumes: &[pod::Volume],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<VolumeClaim>> {
        let mut claims = Vec::new();
        for volume in volumes {
            if let Some(claim) = self.translate(volume, diagnostics)? {
                claims.push(claim);
            }
        }
        Ok(claims)
    }

    /// Only CSI volumes of the configured driver are provisioned,
    /// anything else is skipped with a diagnostic.
    pub fn translate(
        &self,
        volume: &pod::Volume,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<VolumeClaim>> {
        let csi = match volume.source() {
            VolumeSource::Csi(csi) if csi.driver == self.csi_driver => csi,
            VolumeSource::Csi(csi) => {
                diagnostics.push(Diagnostic::UnsupportedVolume {
                    volume: volume.name.to_owned(),
                    source: format!("csi driver {}", csi.driver),
                });
                return Ok(None);
            },
            other => {
                diagnostics.push(Diagnostic::UnsupportedVolume {
                    volume: volume.name.to_owned(),
                    source: other.to_string(),
                });
                return Ok(None);
            },
        };

        let storage = self.size(&volume.name, csi, diagnostics)?.to_string();
        let resources = StringMap::from([("storage".to_string(), storage)]);
        Ok(Some(VolumeClaim {
            name: volume.name.to_owned(),
            slug: volume.name.to_owned(),
            metadata: WorkloadMetadata::default(),
            spec: VolumeClaimSpec {
                // The platform has no storage limit of its own, both sides get the size
                resources: ResourceRequirements {
                    requests: resources.clone(),
                    limits: resources,
                },
            },
        }))
    }

    fn size(
        &self,
        name: &str,
        csi: &CsiVolumeSource,
        diagnostics: &mut Diagnostics,
    ) -> Result<Quantity> {
        let size = match csi.volume_attributes.get(SIZE_ATTRIBUTE) {
            Some(size) => size.parse::<Quantity>().map_err(|error| Error::InvalidVolumeSize {
                volume: name.to_owned(),
                size: size.to_owned(),
                error,
            })?,
            None => DEFAULT_VOLUME_SIZE,
        };

        if size > MAX_VOLUME_SIZE {
            diagnostics.push(Diagnostic::VolumeSizeClamped {
                volume: name.to_owned(),
                requested: size.to_string(),
                size: MAX_VOLUME_SIZE.to_string(),
            });
            return Ok(MAX_VOLUME_SIZE);
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use resources::objects::pod::{EmptyDirVolumeSource, HostPathVolumeSource};

    use super::*;

    const DRIVER: &str = "csi.test.io";

    fn csi(name: &str, driver: &str, size: Option<&str>) -> pod::Volume {
        let mut volume_attributes = BTreeMap::new();
        if let Some(size) = size {
            volume_attributes.insert(SIZE_ATTRIBUTE.to_string(), size.to_string());
        }
        pod::Volume {
            name: name.to_string(),
            csi: Some(CsiVolumeSource {
                driver: driver.to_string(),
                read_only: false,
                volume_attributes,
            }),
            ..Default::default()
        }
    }

    fn translate(volume: &pod::Volume) -> (Result<Option<VolumeClaim>>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let result = VolumeClaimTranslator::new(DRIVER).translate(volume, &mut diagnostics);
        (result, diagnostics)
    }

    #[test]
    fn size_from_attribute() {
        let (result, diagnostics) = translate(&csi("data", DRIVER, Some("10Gi")));
        let claim = result.unwrap().unwrap();
        assert_eq!(claim.name, "data");
        assert_eq!(claim.slug, "data");
        assert_eq!(claim.storage(), Some("10Gi"));
        assert_eq!(claim.spec.resources.limits["storage"], "10Gi");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn default_size() {
        let (result, _) = translate(&csi("data", DRIVER, None));
        assert_eq!(result.unwrap().unwrap().storage(), Some("1Gi"));
    }

    #[test]
    fn oversized_volume_is_clamped() {
        let (result, diagnostics) = translate(&csi("data", DRIVER, Some("2000Gi")));
        let claim = result.unwrap().unwrap();
        assert_eq!(claim.spec.resources.requests["storage"], "1000Gi");
        assert_eq!(claim.spec.resources.limits["storage"], "1000Gi");
        assert_eq!(
            diagnostics.into_iter().collect::<Vec<_>>(),
            vec![Diagnostic::VolumeSizeClamped {
                volume: "data".to_string(),
                requested: "2000Gi".to_string(),
                size: "1000Gi".to_string(),
            }]
        );

        let (result, diagnostics) = translate(&csi("data", DRIVER, Some("1000Gi")));
        assert_eq!(result.unwrap().unwrap().storage(), Some("1000Gi"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn invalid_size_fails() {
        let (result, _) = translate(&csi("data", DRIVER, Some("lots")));
        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidVolumeSize { ref volume, .. } if volume == "data"));
    }

    #[test]
    fn only_configured_driver_is_translated() {
        let volumes = vec![
            csi("data", DRIVER, Some("5Gi")),
            csi("other", "ebs.csi.aws.com", None),
            pod::Volume {
                name: "scratch".to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            },
            pod::Volume {
                name: "host".to_string(),
                host_path: Some(HostPathVolumeSource {
                    path: "/srv".to_string(),
                }),
                ..Default::default()
            },
            csi("logs", DRIVER, None),
        ];
        let mut diagnostics = Diagnostics::new();
        let claims = VolumeClaimTranslator::new(DRIVER)
            .translate_all(&volumes, &mut diagnostics)
            .unwrap();
        assert_eq!(
            claims.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["data", "logs"]
        );
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::UnsupportedVolume { source, .. } if source == "emptyDir"
        )));
    }

    #[test]
    fn service_account_token_volume_is_skipped() {
        let volume: pod::Volume = serde_yaml::from_str(
            r#"
name: kube-api-access-abcde
projected:
  sources:
    - serviceAccountToken:
        path: token
    - downwardAPI:
        items:
          - path: namespace
            fieldRef:
              fieldPath: metadata.namespace
"#,
        )
        .unwrap();
        let (result, diagnostics) = translate(&volume);
        assert_eq!(result.unwrap(), None);
        assert_eq!(
            diagnostics.into_iter().collect::<Vec<_>>(),
            vec![Diagnostic::UnsupportedVolume {
                volume: "kube-api-access-abcde".to_string(),
                source: "projected".to_string(),
            }]
        );
    }
}
