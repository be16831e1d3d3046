//! Peer registry: a keyed collection of peer clients.

use std::collections::HashMap;

use futures::future::join_all;

use super::PeerClient;
use crate::config::AgentConfig;

/// Named collection of peer agent clients, built once from config at
/// startup.
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    peers: HashMap<String, PeerClient>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Build a registry from the `peer.<name>.url`/`.token` config options.
    pub fn from_config(config: &AgentConfig) -> Self {
        let mut registry = Self::new();
        for (name, peer) in &config.peers {
            registry.register(name.clone(), PeerClient::new(peer.url.clone(), peer.token.clone()));
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, client: PeerClient) {
        self.peers.insert(name.into(), client);
    }

    pub fn get(&self, name: &str) -> Option<&PeerClient> {
        self.peers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.peers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Fan out `health_check` to every registered peer and aggregate into a
    /// `name -> healthy` map.
    pub async fn health_check_all(&self) -> HashMap<String, bool> {
        let checks = self.peers.iter().map(|(name, client)| async move {
            (name.clone(), client.is_healthy().await)
        });
        join_all(checks).await.into_iter().collect()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let registry = PeerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = PeerRegistry::new();
        registry.register("knowledge-base", PeerClient::new("http://kb.local", None));
        assert!(registry.contains("knowledge-base"));
        assert!(!registry.contains("other"));
        assert_eq!(registry.get("knowledge-base").unwrap().base_url(), "http://kb.local");
    }

    #[test]
    fn test_from_config_builds_registered_peers() {
        let mut config = AgentConfig::default();
        config.peers.insert(
            "knowledge-base".to_string(),
            crate::config::PeerConfig {
                url: "https://kb.example.com".to_string(),
                token: Some("secret".to_string()),
            },
        );
        let registry = PeerRegistry::from_config(&config);
        assert!(registry.contains("knowledge-base"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_health_check_all_unreachable_peers() {
        let mut registry = PeerRegistry::new();
        registry.register("a", PeerClient::new("http://127.0.0.1:0", None));
        registry.register("b", PeerClient::new("http://127.0.0.1:0", None));
        let results = registry.health_check_all().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results.get("a"), Some(&false));
        assert_eq!(results.get("b"), Some(&false));
    }
}
