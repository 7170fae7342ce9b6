use resources::objects::quantity::QuantityError;
use thiserror::Error;

use crate::probe::ProbeKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort the translation of a whole pod.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unable to find named port: {0}")]
    NamedPortNotFound(String),
    /// The remote platform needs an explicit entrypoint to pass arguments to.
    #[error("container {container}: args not supported without command")]
    ArgsWithoutCommand { container: String },
    #[error("container {container}: {kind} probe: {error}")]
    Probe {
        container: String,
        kind: ProbeKind,
        error: Box<Error>,
    },
    #[error("volume {volume}: invalid size {size:?}: {error}")]
    InvalidVolumeSize {
        volume: String,
        size: String,
        error: QuantityError,
    },
}
