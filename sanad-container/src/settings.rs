//! Container settings.
//!
//! Settings are plain data and deserialize with serde, so an
//! application can keep them next to the rest of its configuration:
//!
//! ```toml
//! [container]
//! provider_policy = "explicit"
//! discover_types = true
//! max_suggestions = 5
//! ```

use serde::Deserialize;

/// Which providers the container consults before constructing a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPolicy {
    /// Only providers registered with `Container::provider`.
    Explicit,
    /// Registered providers first, then the type's own provider capability.
    #[default]
    SelfProviding,
}

/// Tunables for a [`Container`](crate::container::Container).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Provider lookup policy.
    pub provider_policy: ProviderPolicy,
    /// Look up types submitted by `#[derive(Injectable)]` when they
    /// were not registered explicitly.
    pub discover_types: bool,
    /// Maximum "did you mean" entries in unknown-type errors.
    pub max_suggestions: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            provider_policy: ProviderPolicy::default(),
            discover_types: true,
            max_suggestions: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ContainerSettings::default();
        assert_eq!(settings.provider_policy, ProviderPolicy::SelfProviding);
        assert!(settings.discover_types);
        assert_eq!(settings.max_suggestions, 3);
    }

    #[test]
    fn deserialize_partial() {
        let settings: ContainerSettings =
            serde_json::from_str(r#"{ "provider_policy": "explicit" }"#).unwrap();
        assert_eq!(settings.provider_policy, ProviderPolicy::Explicit);
        assert!(settings.discover_types);
    }

    #[test]
    fn deserialize_rejects_unknown_policy() {
        let result: Result<ContainerSettings, _> =
            serde_json::from_str(r#"{ "provider_policy": "sometimes" }"#);
        assert!(result.is_err());
    }
}
