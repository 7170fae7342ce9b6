pub mod provider;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Compute API URL
    pub base_url: String,
    /// Stack the workloads are created in
    pub stack_id: String,
    /// Location code every workload is placed in, e.g. "JFK".
    pub city_code: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://gateway.stackpath.com".to_string(),
            stack_id: String::new(),
            city_code: String::new(),
        }
    }
}
