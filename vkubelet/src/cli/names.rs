use anyhow::Result;
use clap::Args;
use resources::config::provider::ProviderConfig;
use vkubelet::NameDeriver;

use crate::config;

#[derive(Args)]
pub struct Arg {
    /// Namespace of the pod
    namespace: String,
    /// Name of the pod
    name: String,
}

impl Arg {
    pub fn handle(&self, provider: &ProviderConfig) -> Result<()> {
        config::validate(provider)?;

        let names = NameDeriver::from_config(provider);
        let instance = names.instance_ref(&self.namespace, &self.name);
        println!("{: <10} {}", "WORKLOAD", instance.workload_slug);
        println!("{: <10} {}", "INSTANCE", instance.instance_name);
        Ok(())
    }
}
