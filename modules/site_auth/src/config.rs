use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Key of this module's section under `modules` in the application config.
pub const MODULE_NAME: &str = "site_auth";

/// Settings read from `modules.site_auth` in the application config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SiteAuthConfig {
    pub users_collection: String,
    pub contacts_collection: String,
    pub min_password_length: usize,
    pub verification_code_length: usize,
    /// Prepended to phone numbers typed without it.
    pub phone_prefix: String,
    pub modal_transition_ms: u64,
    pub enable_persistence: bool,
}

impl Default for SiteAuthConfig {
    fn default() -> Self {
        Self {
            users_collection: "users".to_string(),
            contacts_collection: "contactSubmissions".to_string(),
            min_password_length: 6,
            verification_code_length: 6,
            phone_prefix: "+".to_string(),
            modal_transition_ms: 300,
            enable_persistence: true,
        }
    }
}

impl SiteAuthConfig {
    /// Deserialize the module's raw section; a missing section yields defaults.
    pub fn from_module_value(raw: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match raw {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| anyhow::anyhow!("invalid {MODULE_NAME} config: {e}")),
            None => Ok(Self::default()),
        }
    }

    pub fn service(&self) -> ServiceConfig {
        ServiceConfig {
            min_password_length: self.min_password_length,
            verification_code_length: self.verification_code_length,
            phone_prefix: self.phone_prefix.clone(),
        }
    }

    pub fn modal_transition(&self) -> Duration {
        Duration::from_millis(self.modal_transition_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg: SiteAuthConfig =
            serde_json::from_value(json!({ "min_password_length": 8 })).unwrap();
        assert_eq!(cfg.min_password_length, 8);
        assert_eq!(cfg.users_collection, "users");
        assert_eq!(cfg.modal_transition(), Duration::from_millis(300));
        assert_eq!(cfg.service().phone_prefix, "+");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SiteAuthConfig::from_module_value(Some(&json!({ "bind_addr": "x" })))
            .unwrap_err();
        assert!(err.to_string().contains("invalid site_auth config"));
        assert!(err.to_string().contains("bind_addr"));
    }

    #[test]
    fn missing_section_is_default() {
        let cfg = SiteAuthConfig::from_module_value(None).unwrap();
        assert_eq!(cfg.contacts_collection, "contactSubmissions");
        assert!(cfg.enable_persistence);
    }
}
