use std::{collections::BTreeMap, fmt::Write};

use indenter::indented;
use serde::{Deserialize, Serialize};

pub mod instance;
pub mod pod;
pub mod quantity;
pub mod secret;
pub mod workload;

pub type Labels = BTreeMap<String, String>;

pub trait Object {
    fn kind(&self) -> &'static str;

    fn name(&self) -> &String;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Name must be unique within a namespace.
    pub name: String,
    /// Namespace defines the space within which each name must be unique.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Map of string keys and values
    /// that can be used to organize and categorize objects.
    #[serde(default)]
    pub labels: Labels,
    /// UID is the unique in time and space value for this object.
    pub uid: Option<String>,
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Object for pod::Pod {
    fn kind(&self) -> &'static str {
        "Pod"
    }

    fn name(&self) -> &String {
        &self.metadata.name
    }
}

impl Object for secret::Secret {
    fn kind(&self) -> &'static str {
        "Secret"
    }

    fn name(&self) -> &String {
        &self.metadata.name
    }
}

/// Write one `key: value` line per label, or `<none>`.
pub(crate) fn write_labels(f: &mut dyn Write, labels: &Labels) -> std::fmt::Result {
    if labels.is_empty() {
        return writeln!(f, "<none>");
    }
    writeln!(f)?;
    for (key, value) in labels {
        writeln!(indented(f), "{}: {}", key, value)?;
    }
    Ok(())
}
