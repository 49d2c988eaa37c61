use reqwest::Method;
use tracing::{info, instrument};

use super::{ApiClient, ClientError};
use crate::{
    auth::dto::{AuthResponse, LoginRequest, RegisterRequest},
    resources::User,
};

/// Client-side login state. Signing in installs the bearer token on the
/// shared client; logging out only forgets it, the token itself stays valid
/// until it expires.
#[derive(Debug)]
pub struct AuthSession {
    client: ApiClient,
    user: Option<User>,
    token: Option<String>,
    loading: bool,
    error: Option<String>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            user: None,
            token: None,
            loading: false,
            error: None,
        }
    }

    /// Resume a session persisted elsewhere.
    pub fn restore(client: ApiClient, token: String, user: User) -> Self {
        client.set_bearer(token.clone());
        Self {
            client,
            user: Some(user),
            token: Some(token),
            loading: false,
            error: None,
        }
    }

    #[instrument(skip(self, credentials))]
    pub async fn login(&mut self, credentials: &LoginRequest) -> bool {
        self.authenticate("/auth/login", credentials, "Login failed").await
    }

    #[instrument(skip(self, data))]
    pub async fn register(&mut self, data: &RegisterRequest) -> bool {
        self.authenticate("/auth/register", data, "Registration failed").await
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.error = None;
        self.client.clear_bearer();
    }

    /// Profile of the signed-in account, as the server sees it.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.client.get("/auth/me").await
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    async fn authenticate<B: serde::Serialize>(
        &mut self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> bool {
        self.loading = true;
        self.error = None;

        let result = self
            .client
            .send::<B, AuthResponse>(Method::POST, path, Some(body))
            .await;
        self.loading = false;

        match result {
            Ok(AuthResponse { token, user }) => {
                info!(user_id = user.id, "signed in");
                self.client.set_bearer(token.clone());
                self.token = Some(token);
                self.user = Some(user);
                true
            }
            Err(e) => {
                self.error = Some(e.server_message().unwrap_or(fallback).to_string());
                false
            }
        }
    }
}
