//! # HOST SETTINGS
//!
//! Process-wide values owned by the hosting page or process: where the
//! services live, which domain is active, the current query string. They are
//! passed explicitly to the application; nothing is looked up globally.

use crate::errors::{error_codes, HxError};
use crate::request::parse_query_string;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    pub services_url: String,
    pub web_socket_url: String,
    #[serde(default)]
    pub domain_id: Option<String>,
    /// Use cases applied when resolving the top-level application.
    #[serde(default)]
    pub usecases: Vec<String>,
    #[serde(default)]
    pub prototyping_module: Option<String>,
    #[serde(default)]
    pub query_string: String,
}

impl HostSettings {
    pub fn new(services_url: impl Into<String>, web_socket_url: impl Into<String>) -> Self {
        Self {
            services_url: services_url.into(),
            web_socket_url: web_socket_url.into(),
            ..Self::default()
        }
    }

    pub fn with_domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.domain_id = Some(domain_id.into());
        self
    }

    pub fn with_usecases(mut self, usecases: Vec<String>) -> Self {
        self.usecases = usecases;
        self
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// Parses settings from their JSON form.
    pub fn from_json(data: &[u8]) -> Result<Self, HxError> {
        let settings: Self = serde_json::from_slice(data).map_err(|e| {
            HxError::configuration(
                error_codes::INVALID_HOST_SETTINGS,
                format!("Invalid host settings JSON: {}", e),
            )
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, HxError> {
        let data = std::fs::read(path).map_err(|e| {
            HxError::configuration(
                error_codes::INVALID_HOST_SETTINGS,
                format!("Failed to read host settings from {}: {}", path.display(), e),
            )
        })?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), HxError> {
        if self.services_url.is_empty() {
            return Err(HxError::configuration(
                error_codes::INVALID_HOST_SETTINGS,
                "servicesUrl must not be empty",
            ));
        }
        if self.web_socket_url.is_empty() {
            return Err(HxError::configuration(
                error_codes::INVALID_HOST_SETTINGS,
                "webSocketUrl must not be empty",
            ));
        }
        Ok(())
    }

    /// Active domain id; an empty value counts as unset.
    pub fn domain_id(&self) -> Option<&str> {
        self.domain_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Decoded value of a parameter of the current query string.
    pub fn query_param(&self, name: &str) -> Option<String> {
        parse_query_string(&self.query_string).remove(name)
    }
}
