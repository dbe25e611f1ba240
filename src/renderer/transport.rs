// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::types::RenderError;

/// Outbound JSON POST. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<Vec<u8>, RenderError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<Vec<u8>, RenderError> {
        // Dropping the request future on timeout aborts the connection
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::USER_AGENT, "pagepress")
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not read error body status={}: {}", status, e);
                    String::new()
                }
            };
            return Err(RenderError::Backend {
                status_code: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;
        debug!("Received response status={} length={}", status, bytes.len());
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout { after: timeout }
    } else {
        // without_url keeps the api token out of the message
        RenderError::Transport(e.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_post_json_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/pdf")
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({ "url": "https://example.com/" }));
                then.status(200).body("%PDF-1.4 fake");
            })
            .await;

        let transport = HttpTransport::new();
        let url = Url::parse(&server.url("/pdf")).unwrap();
        let body = serde_json::json!({ "url": "https://example.com/" });
        let ret = transport
            .post_json(&url, &body, Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ret, b"%PDF-1.4 fake".to_vec());
    }

    #[tokio::test]
    async fn test_post_json_backend_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/pdf");
                then.status(429).body("Too many requests");
            })
            .await;

        let transport = HttpTransport::new();
        let url = Url::parse(&server.url("/pdf")).unwrap();
        let ret = transport
            .post_json(&url, &serde_json::json!({}), Duration::from_secs(5))
            .await;

        assert_eq!(
            ret,
            Err(RenderError::Backend {
                status_code: 429,
                body: "Too many requests".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_post_json_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/pdf");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .body("%PDF-1.4 late");
            })
            .await;

        let transport = HttpTransport::new();
        let url = Url::parse(&server.url("/pdf")).unwrap();
        let timeout = Duration::from_millis(200);
        let ret = transport
            .post_json(&url, &serde_json::json!({}), timeout)
            .await;

        assert_eq!(ret, Err(RenderError::Timeout { after: timeout }));
    }

    #[tokio::test]
    async fn test_post_json_connection_refused() {
        let transport = HttpTransport::new();
        // port 9 (discard) is not expected to be listening
        let url = Url::parse("http://127.0.0.1:9/pdf").unwrap();
        let ret = transport
            .post_json(&url, &serde_json::json!({}), Duration::from_secs(5))
            .await;

        assert!(matches!(ret, Err(RenderError::Transport(_))));
    }
}
