//! Translation between pods and the workloads of a remote compute platform.
//!
//! A virtual node hands every pod scheduled onto it to [`PodTranslator`],
//! which turns it into a workload create request, and reports the pod's
//! status back through [`status::pod_status`]. Nothing in here performs I/O.

pub mod container;
pub mod credentials;
pub mod diagnostics;
mod error;
pub mod names;
pub mod probe;
pub mod resource_class;
pub mod status;
pub mod volume;
pub mod workload;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use names::NameDeriver;
pub use workload::{PodTranslator, Translation};
