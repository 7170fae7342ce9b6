use resources::objects::{
    pod::LocalObjectReference,
    secret::{DockerConfig, Secret, DOCKER_CONFIG_JSON_TYPE},
    workload::{DockerRegistryCredentials, ImagePullCredential},
};

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Read access to the secrets of the cluster the pods come from.
pub trait SecretLister: Send + Sync {
    fn get_secret(&self, namespace: &str, name: &str) -> Option<Secret>;
}

impl SecretLister for Vec<Secret> {
    fn get_secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.iter()
            .find(|s| s.metadata.namespace == namespace && s.metadata.name == name)
            .cloned()
    }
}

/// Registry credentials from the pod's image pull secrets, one per registry server.
///
/// A secret that cannot be used is reported and skipped,
/// the image may well be public.
pub fn image_pull_credentials(
    lister: &dyn SecretLister,
    namespace: &str,
    references: &[LocalObjectReference],
    diagnostics: &mut Diagnostics,
) -> Vec<ImagePullCredential> {
    let mut credentials = Vec::new();
    for reference in references {
        match from_secret(lister, namespace, &reference.name) {
            Ok(found) => credentials.extend(found),
            Err(reason) => diagnostics.push(Diagnostic::ImagePullSecretSkipped {
                secret: reference.name.to_owned(),
                reason,
            }),
        }
    }
    credentials
}

fn from_secret(
    lister: &dyn SecretLister,
    namespace: &str,
    name: &str,
) -> Result<Vec<ImagePullCredential>, String> {
    let secret = lister
        .get_secret(namespace, name)
        .ok_or_else(|| format!("secret not found in namespace {}", namespace))?;
    if secret.type_ != DOCKER_CONFIG_JSON_TYPE {
        return Err(format!("unsupported secret type {:?}", secret.type_));
    }
    let json = secret
        .docker_config_json()
        .ok_or_else(|| "no docker config in secret".to_owned())?;
    let config: DockerConfig =
        serde_json::from_str(json).map_err(|e| format!("invalid docker config: {}", e))?;

    let mut credentials = Vec::new();
    for (server, auth) in config.auths {
        let (username, password) = match (auth.username, auth.password) {
            (Some(username), Some(password)) => (username, password),
            _ => return Err(format!("no username or password for {}", server)),
        };
        credentials.push(ImagePullCredential {
            docker_registry: DockerRegistryCredentials {
                server,
                username,
                password,
                email: auth.email.unwrap_or_default(),
            },
        });
    }
    Ok(credentials)
}
