use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use resources::config::provider::ProviderConfig;

/// Prefix of the environment variables overriding the configuration file,
/// e.g. `VK_NODE_NAME` or `VK_API__CITY_CODE`.
pub const ENV_PREFIX: &str = "VK";
/// Separates list items in environment values, `VK_IGNORED_ENV_VARS=FOO,BAR`.
pub const LIST_SEPARATOR: &str = ",";

/// Load the provider configuration from an optional YAML file
/// and the environment, later sources win.
pub fn load(path: Option<&Path>) -> Result<ProviderConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
    }
    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                // lists are only split when parsing is on
                .try_parsing(true)
                .list_separator(LIST_SEPARATOR)
                .with_list_parse_key("ignored_env_vars"),
        )
        .build()
        .with_context(|| "Failed to load config".to_string())?
        .try_deserialize::<ProviderConfig>()
        .with_context(|| "Failed to parse config".to_string())
}

/// Settings a workload cannot be built without.
pub fn validate(config: &ProviderConfig) -> Result<()> {
    if config.api.city_code.is_empty() {
        bail!("api.city_code is not set, workloads need a location");
    }
    if config.target_name.is_empty() {
        bail!("target_name must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    #[test]
    fn file_overrides_defaults() {
        let path = env::temp_dir().join(format!("vkubelet-config-{}.yaml", process::id()));
        fs::write(
            &path,
            "node_name: edge-1\ninternal_ip: 192.168.1.10\napi:\n  stack_id: demo\n  city_code: AMS\n",
        )
        .unwrap();
        let config = load(Some(path.as_path())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.node_name, "edge-1");
        assert_eq!(config.internal_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(config.api.stack_id, "demo");
        assert_eq!(config.api.city_code, "AMS");
        assert_eq!(config.target_name, "default");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn ignored_env_vars_from_environment() {
        env::set_var("VK_IGNORED_ENV_VARS", "SECRET_TOKEN,DEBUG");
        let config = load(None);
        env::remove_var("VK_IGNORED_ENV_VARS");

        assert_eq!(
            config.unwrap().ignored_env_vars,
            vec!["SECRET_TOKEN".to_string(), "DEBUG".to_string()]
        );
    }

    #[test]
    fn missing_file_fails() {
        let path = env::temp_dir().join("vkubelet-config-does-not-exist.yaml");
        assert!(load(Some(path.as_path())).is_err());
    }

    #[test]
    fn city_code_is_required() {
        let config = ProviderConfig::default();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("city_code"));
    }
}
