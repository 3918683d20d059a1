//! Connection target derived from registry values.

use retcon_config::{ConfigRegistry, KeyDeclaration, PropertyKind};
use std::fmt;

/// Scheme used when the registry does not override it.
pub const DEFAULT_SCHEME: &str = "ws";
/// String key holding the server host (and optional port).
pub const HOST_KEY: &str = "host";
/// String key holding the application id appended to `/ws/`.
pub const APP_ID_KEY: &str = "appId";
/// Optional string key overriding the scheme.
pub const SCHEME_KEY: &str = "scheme";

/// Declare the target keys as strings so numeric ids and case-folded
/// environment names land in the string bucket.
pub fn declare_target_keys(registry: &ConfigRegistry) {
    registry.declare(HOST_KEY, KeyDeclaration::required(PropertyKind::String));
    registry.declare(APP_ID_KEY, KeyDeclaration::required(PropertyKind::String));
    registry.declare(SCHEME_KEY, KeyDeclaration::optional(PropertyKind::String));
}

/// Scheme, host and path of the websocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub scheme: String,
    pub host: String,
    pub path: String,
}

impl ConnectionTarget {
    /// Derive `<scheme>://<host>/ws/<appId>`; absent values become empty.
    pub fn from_registry(registry: &ConfigRegistry) -> Self {
        let scheme = registry
            .get_string(SCHEME_KEY)
            .filter(|scheme| !scheme.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        let host = registry.get_string(HOST_KEY).unwrap_or_default();
        let app_id = registry.get_string(APP_ID_KEY).unwrap_or_default();
        Self {
            scheme,
            host,
            path: format!("/ws/{app_id}"),
        }
    }

    /// Full URL passed to the transport.
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use retcon_config::PropertyValue;
    use serde_json::Number;

    #[test]
    fn derives_url_from_host_and_app_id() {
        let registry = ConfigRegistry::new();
        registry.insert(HOST_KEY, 10, PropertyValue::String("example.com".to_string()));
        registry.insert(APP_ID_KEY, 10, PropertyValue::String("42".to_string()));
        let target = ConnectionTarget::from_registry(&registry);
        assert_eq!(target.url(), "ws://example.com/ws/42");
        assert_eq!(target.path, "/ws/42");
    }

    #[test]
    fn absent_values_yield_empty_components() {
        let registry = ConfigRegistry::new();
        let target = ConnectionTarget::from_registry(&registry);
        assert_eq!(target.url(), "ws:///ws/");
    }

    #[test]
    fn scheme_can_be_overridden() {
        let registry = ConfigRegistry::new();
        registry.insert(SCHEME_KEY, 10, PropertyValue::String("wss".to_string()));
        registry.insert(HOST_KEY, 10, PropertyValue::String("secure.example".to_string()));
        let target = ConnectionTarget::from_registry(&registry);
        assert_eq!(target.to_string(), "wss://secure.example/ws/");
        assert_eq!(target.url(), target.to_string());
    }

    #[test]
    fn numeric_app_id_outside_string_bucket_is_ignored() {
        let registry = ConfigRegistry::new();
        registry.insert(HOST_KEY, 10, PropertyValue::String("example.com".to_string()));
        registry.insert(APP_ID_KEY, 10, PropertyValue::Number(Number::from(42)));
        let target = ConnectionTarget::from_registry(&registry);
        assert_eq!(target.url(), "ws://example.com/ws/");
    }
}
