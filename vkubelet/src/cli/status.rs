use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use resources::{config::provider::ProviderConfig, objects::instance::Instance};
use vkubelet::status;

#[derive(Args)]
pub struct Arg {
    /// Instance as returned by the compute API, JSON or YAML
    #[clap(short, long, parse(from_os_str), value_name = "FILE")]
    file: PathBuf,
    /// Address reported as the pod's host IP, defaults to the configured internal IP
    #[clap(long, value_name = "IP")]
    host_ip: Option<String>,
}

impl Arg {
    pub fn handle(&self, provider: &ProviderConfig) -> Result<()> {
        let path = self.file.as_path();
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
        let instance: Instance = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse file {}", path.display()))?;

        let host_ip = self
            .host_ip
            .as_deref()
            .or(provider.internal_ip.as_deref());
        let pod_status = status::pod_status(&instance, host_ip);
        tracing::info!(
            "Instance {} is {} as a pod",
            instance.name,
            pod_status.phase
        );

        print!("{}", serde_yaml::to_string(&pod_status)?);
        Ok(())
    }
}
