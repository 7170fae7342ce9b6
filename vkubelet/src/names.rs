use resources::config::provider::ProviderConfig;

/// Remote identity of a pod: the workload it became and its only instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub workload_slug: String,
    pub instance_name: String,
}

/// Derives remote names from a pod's namespace and name.
///
/// Create, delete and status calls all go through here,
/// so the same pod always addresses the same remote objects,
/// including after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDeriver {
    target_name: String,
    city_code: String,
}

impl NameDeriver {
    pub fn new(target_name: impl Into<String>, city_code: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            city_code: city_code.into(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(&config.target_name, &config.api.city_code)
    }

    /// `<namespace>-<name>`, lowercased, anything outside `[a-z0-9-]` replaced by `-`.
    pub fn workload_slug(&self, namespace: &str, name: &str) -> String {
        sanitize(&format!("{}-{}", namespace, name))
    }

    pub fn workload_name(&self, namespace: &str, name: &str) -> String {
        self.workload_slug(namespace, name)
    }

    /// The platform names instances `<workload>-<target>-<city>-<ordinal>`.
    /// Replicas are pinned to one, so the ordinal is always 0.
    pub fn instance_name(&self, namespace: &str, name: &str) -> String {
        format!(
            "{}-{}-{}-0",
            self.workload_slug(namespace, name),
            sanitize(&self.target_name),
            sanitize(&self.city_code)
        )
    }

    pub fn instance_ref(&self, namespace: &str, name: &str) -> InstanceRef {
        InstanceRef {
            workload_slug: self.workload_slug(namespace, name),
            instance_name: self.instance_name(namespace, name),
        }
    }
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_url_safe() {
        let names = NameDeriver::new("default", "JFK");
        assert_eq!(names.workload_slug("shop", "web"), "shop-web");
        assert_eq!(names.workload_slug("Shop", "web.v2_beta"), "shop-web-v2-beta");
        assert_eq!(names.workload_name("shop", "web"), "shop-web");
    }

    #[test]
    fn instance_name_includes_target_and_city() {
        let names = NameDeriver::new("default", "JFK");
        assert_eq!(names.instance_name("shop", "web"), "shop-web-default-jfk-0");
    }

    #[test]
    fn derivation_is_idempotent() {
        let first = NameDeriver::new("default", "AMS").instance_ref("ns", "pod");
        let second = NameDeriver::new("default", "AMS").instance_ref("ns", "pod");
        assert_eq!(first, second);
        assert_eq!(first.workload_slug, "ns-pod");
        assert_eq!(first.instance_name, "ns-pod-default-ams-0");
    }

    #[test]
    fn from_config() {
        let mut config = ProviderConfig::default();
        config.api.city_code = "LAX".to_string();
        let names = NameDeriver::from_config(&config);
        assert_eq!(names.instance_name("a", "b"), "a-b-default-lax-0");
    }
}
