//! Registered service-provider configuration.
//!
//! The bridge serves a fixed set of service providers, keyed by the short
//! identifier carried in the `spId` query parameter. Configuration is loaded
//! once at startup from a JSON document and read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};
use crate::types::SamlBinding;

/// Assertion Consumer Service endpoint of a service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcsEndpoint {
    /// The endpoint URL.
    pub location: String,
    /// The binding URI (HTTP-POST or HTTP-Redirect).
    pub binding: String,
    /// Index of this endpoint in the SP's metadata.
    #[serde(default)]
    pub index: u32,
    /// Whether this is the SP's default endpoint.
    #[serde(default)]
    pub is_default: bool,
}

impl AcsEndpoint {
    /// Returns the parsed binding, if it is one the bridge supports.
    #[must_use]
    pub fn parsed_binding(&self) -> Option<SamlBinding> {
        SamlBinding::from_uri(&self.binding)
    }
}

/// Configuration of one registered service provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProviderConfig {
    /// Entity ID of the service provider.
    pub entity_id: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Assertion Consumer Service endpoints, in metadata order.
    pub acs_endpoints: Vec<AcsEndpoint>,

    /// Name ID format URI to issue for this SP. Transient when absent.
    #[serde(default)]
    pub name_id_format: Option<String>,

    /// Whether this SP may initiate logins.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Registry of service providers keyed by their short identifier.
#[derive(Debug, Clone, Default)]
pub struct ServiceProviderRegistry {
    providers: HashMap<String, ServiceProviderConfig>,
}

impl ServiceProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a registry from a JSON document mapping SP id to configuration.
    pub fn from_json(json: &str) -> SamlResult<Self> {
        let providers: HashMap<String, ServiceProviderConfig> = serde_json::from_str(json)
            .map_err(|e| SamlError::Internal(format!("Invalid service provider config: {e}")))?;

        for (id, sp) in &providers {
            if sp.acs_endpoints.is_empty() {
                return Err(SamlError::Internal(format!(
                    "Service provider '{id}' has no assertion consumer endpoints"
                )));
            }
            for endpoint in &sp.acs_endpoints {
                if endpoint.parsed_binding().is_none() {
                    return Err(SamlError::UnsupportedBinding(format!(
                        "service provider '{id}' endpoint '{}': {}",
                        endpoint.location, endpoint.binding
                    )));
                }
            }
        }

        Ok(Self { providers })
    }

    /// Registers a service provider, replacing any existing entry.
    pub fn insert(&mut self, id: impl Into<String>, config: ServiceProviderConfig) {
        self.providers.insert(id.into(), config);
    }

    /// Looks up an enabled service provider by id.
    ///
    /// Disabled providers are indistinguishable from unregistered ones.
    pub fn get(&self, id: &str) -> SamlResult<&ServiceProviderConfig> {
        self.providers
            .get(id)
            .filter(|sp| sp.enabled)
            .ok_or_else(|| SamlError::UnknownServiceProvider(id.to_string()))
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
