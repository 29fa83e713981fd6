//! Client for the calendar generation service.

use crate::error::{network_error, InviteResult};
use reqwest::Client;
use tracing::{error, info};

/// Fetches calendar documents from an ICS download link
#[derive(Debug, Clone, Default)]
pub struct GenerationClient {
    http: Client,
}

impl GenerationClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Download the document behind `url`; no retry is attempted
    pub async fn fetch_document(&self, url: &str) -> InviteResult<String> {
        info!("Fetching calendar document from {}", url);

        let response = self.http.get(url).send().await.map_err(|e| {
            error!("Calendar generation request failed: {}", e);
            network_error(&format!("Request failed: {}", e))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| network_error(&format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            error!("Calendar generation service returned {}: {}", status, body);
            return Err(network_error(&format!(
                "Service returned {}: {}",
                status, body
            )));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_service_is_network_failure() {
        let client = GenerationClient::new();
        // Port 9 (discard) on loopback is not listening in test environments
        let result = client
            .fetch_document("http://127.0.0.1:9/?start=2025-03-10T18:00:00Z")
            .await;
        assert!(matches!(
            result,
            Err(crate::error::Error::NetworkFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_url_is_network_failure() {
        let client = GenerationClient::new();
        assert!(client.fetch_document("not a url").await.is_err());
    }
}
