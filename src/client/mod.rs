//! HTTP client side of the workshop: a thin JSON client plus the
//! framework-independent fetch/mutate/form hooks and the auth session that
//! UI code builds on.

mod hooks;
mod session;

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub use hooks::{
    Fetch, FetchState, FormMethod, FormState, FormSubmit, Mutation, MutationMethod, MutationState,
};
pub use session::AuthSession;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{}", status_text(.status, .message))]
    Status { status: u16, message: Option<String> },
    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.to_string(),
        None => format!("Request failed with status code {status}"),
    }
}

impl ClientError {
    /// The `error` (or `message`) field of the server's JSON body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// JSON client rooted at the service URL. Clones share the bearer token, so
/// a login through one handle authenticates every hook built from it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_bearer(&self, token: impl Into<String>) {
        *self.bearer.write() = Some(token.into());
    }

    pub fn clear_bearer(&self) {
        *self.bearer.write() = None;
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.read().clone()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    /// Sends an optional JSON body and decodes the reply. An empty reply
    /// (204) decodes as JSON `null`, so `()` and `Option<_>` both work.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if let Some(token) = self.bearer() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        debug!(%method, %url, %status, "api call");

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes).ok().and_then(|body| {
                body.get("error")
                    .or_else(|| body.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            });
            warn!(%status, "API error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() {
            Ok(serde_json::from_value(Value::Null)?)
        } else {
            Ok(serde_json::from_slice(&bytes)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_prefer_the_server_message() {
        let err = ClientError::Status {
            status: 404,
            message: Some("Student not found".into()),
        };
        assert_eq!(err.to_string(), "Student not found");
        assert_eq!(err.server_message(), Some("Student not found"));
        assert_eq!(err.status(), Some(404));

        let err = ClientError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed with status code 502");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn clones_share_the_bearer_token() {
        let client = ApiClient::new("http://localhost:4000/api/");
        assert_eq!(client.base_url(), "http://localhost:4000/api");
        let hook_side = client.clone();
        client.set_bearer("abc");
        assert_eq!(hook_side.bearer().as_deref(), Some("abc"));
        hook_side.clear_bearer();
        assert!(client.bearer().is_none());
    }
}
