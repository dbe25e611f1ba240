// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::{
    config::BackendConfig,
    renderer::{
        request::RenderRequest,
        transport::{HttpTransport, Transport},
    },
    types::RenderError,
};

pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Checks the backend can be called at all, without touching the network
    fn check(&self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

/// Hosted headless browser, authenticated with a token query parameter
pub struct BrowserlessBackend {
    endpoint: Url,
    api_key: Option<String>,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BrowserlessBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BrowserlessBackend({})", self.endpoint)
    }
}

impl BrowserlessBackend {
    pub fn new(config: &BackendConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout: config.request_timeout(),
            transport,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    fn api_key(&self) -> Result<&str, RenderError> {
        self.api_key.as_deref().ok_or_else(|| {
            RenderError::Configuration("Browserless API key is not configured".to_string())
        })
    }

    fn endpoint_with_token(&self, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", token);
        url
    }
}

#[async_trait]
impl RenderBackend for BrowserlessBackend {
    fn check(&self) -> Result<(), RenderError> {
        self.api_key().map(|_| ())
    }

    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let token = self.api_key()?;
        let body = serde_json::to_value(request).map_err(|e| {
            RenderError::Configuration(format!("Could not serialize render request: {}", e))
        })?;

        debug!("Posting render request url={}", request.url);
        let pdf = self
            .transport
            .post_json(&self.endpoint_with_token(token), &body, self.timeout)
            .await?;

        if !pdf.starts_with(PDF_SIGNATURE) {
            let head = String::from_utf8_lossy(&pdf[..pdf.len().min(64)]).to_string();
            return Err(RenderError::InvalidResponse(format!(
                "response is not a PDF ({} bytes, starts with {:?})",
                pdf.len(),
                head
            )));
        }
        info!("Rendered url={} length={}", request.url, pdf.len());
        Ok(pdf)
    }
}
