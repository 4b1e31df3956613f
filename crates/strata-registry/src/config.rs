use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub tenant_id: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    /// TTL for single-schema reads, in seconds.
    #[serde(default = "default_schema_ttl")]
    pub schema_ttl_secs: u64,
    /// Shorter TTL for the unified multi-entity path.
    #[serde(default = "default_unified_ttl")]
    pub unified_ttl_secs: u64,
}

fn default_schema_ttl() -> u64 {
    300
}

fn default_unified_ttl() -> u64 {
    120
}

impl RegistryConfig {
    pub fn new(base_url: &str, tenant_id: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            tenant_id: tenant_id.to_string(),
            auth_token: None,
            schema_ttl_secs: default_schema_ttl(),
            unified_ttl_secs: default_unified_ttl(),
        }
    }

    pub fn schema_ttl(&self) -> Duration {
        Duration::from_secs(self.schema_ttl_secs)
    }

    pub fn unified_ttl(&self) -> Duration {
        Duration::from_secs(self.unified_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_omitted() {
        let config: RegistryConfig = serde_json::from_str(
            r#"{ "base_url": "http://localhost:5000", "tenant_id": "1" }"#,
        )
        .unwrap();

        assert_eq!(config.schema_ttl(), Duration::from_secs(300));
        assert_eq!(config.unified_ttl(), Duration::from_secs(120));
        assert!(config.auth_token.is_none());
    }
}
