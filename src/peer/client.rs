//! Peer client: outbound A2A RPC to another agent.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

const DEFAULT_EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CARD_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to a peer agent: base URL plus an optional bearer token. Safe
/// for concurrent use — each call opens its own short-lived request.
#[derive(Clone)]
pub struct PeerClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl std::fmt::Debug for PeerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl PeerClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/a2a/execute` — invoke a skill on the peer.
    ///
    /// Never raises: transport failures are folded into `{success:false,
    /// error}`, matching the shape a local skill failure would produce.
    pub async fn execute_skill(&self, skill_id: &str, input: Value) -> Value {
        let url = format!("{}/a2a/execute", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({ "skill_id": skill_id, "input": input });

        let mut request = self
            .http
            .post(&url)
            .timeout(DEFAULT_EXECUTE_TIMEOUT)
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => match response.json::<Value>().await {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, skill_id, peer = %self.base_url, "peer returned non-JSON body");
                    serde_json::json!({"success": false, "error": format!("invalid peer response: {e}")})
                }
            },
            Err(e) => {
                warn!(error = %e, skill_id, peer = %self.base_url, "A2A communication failed");
                serde_json::json!({"success": false, "error": format!("A2A communication failed: {e}")})
            }
        }
    }

    /// `GET {base}/.well-known/agent.json` — returns `{}` on any failure.
    pub async fn get_agent_card(&self) -> Value {
        let url = format!(
            "{}/.well-known/agent.json",
            self.base_url.trim_end_matches('/')
        );
        match self
            .http
            .get(&url)
            .timeout(DEFAULT_CARD_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response
                .json::<Value>()
                .await
                .unwrap_or_else(|_| serde_json::json!({})),
            Err(e) => {
                warn!(error = %e, peer = %self.base_url, "failed to fetch peer agent card");
                serde_json::json!({})
            }
        }
    }

    /// `GET {base}/health` — returns `{status:"unhealthy", error}` on any
    /// transport failure instead of raising.
    pub async fn health_check(&self) -> Value {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        match self
            .http
            .get(&url)
            .timeout(DEFAULT_HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.json::<Value>().await.unwrap_or_else(|e| {
                serde_json::json!({"status": "unhealthy", "error": e.to_string()})
            }),
            Err(e) => {
                warn!(error = %e, peer = %self.base_url, "peer health check failed");
                serde_json::json!({"status": "unhealthy", "error": e.to_string()})
            }
        }
    }

    /// `true` iff the peer reports `status == "healthy"`.
    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.get("status").and_then(Value::as_str) == Some("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_token() {
        let client = PeerClient::new("https://kb.example.com", None);
        assert_eq!(client.base_url(), "https://kb.example.com");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let client = PeerClient::new("https://kb.example.com", Some("secret".to_string()));
        let debug_str = format!("{client:?}");
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("has_token: true"));
    }

    #[tokio::test]
    async fn test_execute_skill_unreachable_returns_failure_shape() {
        // Port 0 never accepts a connection; this exercises the transport
        // error path without needing a live server.
        let client = PeerClient::new("http://127.0.0.1:0", None);
        let result = client
            .execute_skill("get_deployment_info", serde_json::json!({}))
            .await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("A2A communication failed"));
    }

    #[tokio::test]
    async fn test_health_check_unreachable_returns_unhealthy() {
        let client = PeerClient::new("http://127.0.0.1:0", None);
        let result = client.health_check().await;
        assert_eq!(result["status"], "unhealthy");
        assert!(result["error"].is_string());
    }

    #[tokio::test]
    async fn test_is_healthy_false_when_unreachable() {
        let client = PeerClient::new("http://127.0.0.1:0", None);
        assert!(!client.is_healthy().await);
    }
}
