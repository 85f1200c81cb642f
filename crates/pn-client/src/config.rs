use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where the board API lives, e.g. `http://127.0.0.1:8080`
    pub base_url: String,
    /// Hard ceiling on one request; a hung request becomes a network error.
    #[serde(with = "seconds")]
    pub request_timeout: Duration,
    /// Fingerprint namespace. Must match across all clients of a deployment.
    pub namespace: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(10),
            namespace: "pigeon-board".to_string(),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(de)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "base_url": "https://board.example", "request_timeout": 3 }"#)
                .unwrap();
        assert_eq!(config.base_url, "https://board.example");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.namespace, "pigeon-board");
    }
}
