//! Provider registry populated at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WalletError;

use super::{OkxProvider, UnisatProvider, WalletProvider};

/// Maps brand names to adapters. Lookup of an unregistered brand is a typed
/// `ProviderUnavailable`, never a panic or a silent None.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn WalletProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in brand adapter wired to the bridge.
    pub fn with_defaults(bridge_url: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OkxProvider::new(bridge_url)));
        registry.register(Arc::new(UnisatProvider::new(bridge_url)));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn WalletProvider>) {
        log::info!("Registered wallet provider: {}", provider.name());
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| WalletError::ProviderUnavailable(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_builtin_brands() {
        let registry = ProviderRegistry::with_defaults("http://localhost:4001");
        assert!(registry.get("okx").is_ok());
        assert!(registry.get("unisat").is_ok());
    }

    #[test]
    fn unknown_brand_is_a_typed_error() {
        let registry = ProviderRegistry::new();
        match registry.get("leather") {
            Err(WalletError::ProviderUnavailable(name)) => assert_eq!(name, "leather"),
            other => panic!("expected ProviderUnavailable, got {:?}", other.map(|p| p.name())),
        }
    }
}
