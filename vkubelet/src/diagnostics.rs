use std::fmt;

use crate::probe::ProbeKind;

/// Something a pod asked for that the remote platform cannot honor.
/// The affected part is left out and the translation carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnsupportedProbe {
        container: String,
        kind: ProbeKind,
        handler: &'static str,
    },
    EnvVarFromSource {
        container: String,
        name: String,
    },
    UnsupportedVolume {
        volume: String,
        source: String,
    },
    VolumeSizeClamped {
        volume: String,
        requested: String,
        size: String,
    },
    ImagePullSecretSkipped {
        secret: String,
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedProbe {
                container,
                kind,
                handler,
            } => write!(
                f,
                "{} probe of container {} uses {}, which is not supported, skipping",
                kind, container, handler
            ),
            Diagnostic::EnvVarFromSource {
                container,
                name,
            } => write!(
                f,
                "Value From is not supported for env var {} of container {}",
                name, container
            ),
            Diagnostic::UnsupportedVolume {
                volume,
                source,
            } => write!(
                f,
                "skipping volume {} ({}), only CSI volumes of the configured driver are supported",
                volume, source
            ),
            Diagnostic::VolumeSizeClamped {
                volume,
                requested,
                size,
            } => write!(
                f,
                "adjusting size of volume {} from {} to the {} limit",
                volume, requested, size
            ),
            Diagnostic::ImagePullSecretSkipped {
                secret,
                reason,
            } => write!(f, "skipping image pull secret {}: {}", secret, reason),
        }
    }
}

/// Ordered record of the diagnostics raised while translating one pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the diagnostic and keep it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::EnvVarFromSource { .. } | Diagnostic::ImagePullSecretSkipped { .. } => {
                tracing::warn!("{}", diagnostic)
            },
            _ => tracing::info!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
