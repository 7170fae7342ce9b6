use std::{fs::File, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use resources::{
    config::provider::ProviderConfig,
    objects::{pod::Pod, secret::Secret, Object},
};
use vkubelet::PodTranslator;

use crate::config;

#[derive(Args)]
pub struct Arg {
    /// The definition YAML file of the pod
    #[clap(short, long, parse(from_os_str), value_name = "FILE")]
    file: PathBuf,
    /// YAML list of the secrets image pull secrets are looked up in
    #[clap(short, long, parse(from_os_str), value_name = "FILE")]
    secrets: Option<PathBuf>,
    /// Print a human readable summary instead of the JSON request
    #[clap(long)]
    summary: bool,
}

impl Arg {
    pub fn handle(&self, provider: ProviderConfig) -> Result<()> {
        config::validate(&provider)?;

        let path = self.file.as_path();
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
        let pod: Pod = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse file {}", path.display()))?;

        let mut translator = PodTranslator::new(provider);
        if let Some(path) = &self.secrets {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file {}", path.display()))?;
            let secrets: Vec<Secret> = serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to parse secrets in {}", path.display()))?;
            tracing::info!("Loaded {} secrets from {}", secrets.len(), path.display());
            translator = translator.with_secrets(Arc::new(secrets));
        }

        let translation = translator
            .translate(&pod)
            .with_context(|| format!("Failed to translate pod {}", pod.name()))?;
        if !translation.diagnostics.is_empty() {
            tracing::warn!(
                "Pod {} translated with {} parts left out",
                pod.name(),
                translation.diagnostics.len()
            );
        }

        if self.summary {
            print!("{}", translation.workload);
        } else {
            println!("{}", serde_json::to_string_pretty(&translation.workload)?);
        }
        Ok(())
    }
}
