//! Named set of remote tool providers

use std::collections::BTreeMap;
use std::sync::Arc;

use super::remote::RemoteToolProvider;

/// Read-only mapping from provider id to remote provider handle
///
/// Iteration is lexicographic by provider id. That order decides both the
/// enumeration order and which provider wins a tool name collision.
#[derive(Clone, Default)]
pub struct ConnectionSet {
    providers: BTreeMap<String, Arc<dyn RemoteToolProvider>>,
}

impl ConnectionSet {
    /// Create an empty connection set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider, replacing any provider with the same id
    pub fn with(mut self, id: impl Into<String>, provider: Arc<dyn RemoteToolProvider>) -> Self {
        self.insert(id, provider);
        self
    }

    /// Add a provider, replacing any provider with the same id
    pub fn insert(&mut self, id: impl Into<String>, provider: Arc<dyn RemoteToolProvider>) {
        self.providers.insert(id.into(), provider);
    }

    /// Get a provider by id
    pub fn get(&self, id: &str) -> Option<&Arc<dyn RemoteToolProvider>> {
        self.providers.get(id)
    }

    /// Iterate providers in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn RemoteToolProvider>)> {
        self.providers.iter().map(|(id, p)| (id.as_str(), p))
    }

    /// Provider ids in iteration order
    pub fn ids(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if there are no providers
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ConnectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSet")
            .field("providers", &self.ids())
            .finish()
    }
}
