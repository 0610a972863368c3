//! JSON-over-HTTP adapter for the RPC backend: each call POSTs the envelope to one endpoint
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use super::{Backend, BackendError, BackendRequest, BackendResponse, Result};

pub fn default_user_agent() -> String {
    format!("recordform/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl HttpBackend {
    pub fn new(endpoint: Url, user_agent: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            user_agent: user_agent.unwrap_or_else(default_user_agent),
        }
    }

    pub fn try_new(endpoint: &str, user_agent: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| BackendError::Generic {
            reason: format!("Invalid backend URL {endpoint:?}: {e}"),
        })?;

        Ok(Self::new(endpoint, user_agent))
    }

    fn request_builder(&self, request: &BackendRequest) -> RequestBuilder {
        self.client
            .post(self.endpoint.clone())
            .header("User-Agent", self.user_agent.as_str())
            .json(request)
    }

    /// Send a request, converting non-2xx/3xx responses to errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(BackendError::Transport)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn call(&self, request: BackendRequest) -> Result<BackendResponse> {
        debug!(
            "POST {} {}.{}.{}",
            self.endpoint, request.package_name, request.class_name, request.method_name
        );

        let response = self.send(self.request_builder(&request)).await?;
        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }
}
