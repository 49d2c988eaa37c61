use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use super::{ApiClient, ClientError};

fn describe(err: &ClientError, fallback: &str) -> String {
    let message = err.to_string();
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Read hook: GET a path, keep the last result, refetch on demand.
///
/// Clones share state. Overlapping refetches are not de-duplicated; whichever
/// finishes last wins.
#[derive(Debug, Clone)]
pub struct Fetch<T> {
    client: ApiClient,
    path: String,
    state: Arc<Mutex<FetchState<T>>>,
}

impl<T: DeserializeOwned + Clone> Fetch<T> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            state: Arc::new(Mutex::new(FetchState::default())),
        }
    }

    /// Equivalent of mounting the hook: fetches right away when `immediate`.
    pub async fn mount(client: ApiClient, path: impl Into<String>, immediate: bool) -> Self {
        let hook = Self::new(client, path);
        if immediate {
            hook.refetch().await;
        }
        hook
    }

    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn refetch(&self) {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let result = self.client.get::<T>(&self.path).await;

        let mut state = self.state.lock();
        match result {
            Ok(data) => state.data = Some(data),
            Err(e) => {
                state.error = Some(describe(&e, "Failed to load data"));
                state.data = None;
            }
        }
        state.loading = false;
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.state.lock().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.lock().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    Post,
    Put,
    Delete,
}

impl From<MutationMethod> for Method {
    fn from(m: MutationMethod) -> Self {
        match m {
            MutationMethod::Post => Method::POST,
            MutationMethod::Put => Method::PUT,
            MutationMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Write hook for POST/PUT/DELETE. Failures are recorded, never retried.
#[derive(Debug, Clone)]
pub struct Mutation {
    client: ApiClient,
    state: Arc<Mutex<MutationState>>,
}

impl Mutation {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(MutationState::default())),
        }
    }

    /// Returns the decoded reply, or `None` when the call failed. DELETE
    /// never sends a body.
    #[instrument(skip(self, body))]
    pub async fn mutate<B, R>(
        &self,
        path: &str,
        method: MutationMethod,
        body: Option<&B>,
    ) -> Option<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let body = if method == MutationMethod::Delete { None } else { body };
        let result = self.client.send::<B, R>(method.into(), path, body).await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(reply) => Some(reply),
            Err(e) => {
                state.error = Some(describe(&e, "Operation failed"));
                None
            }
        }
    }

    pub fn snapshot(&self) -> MutationState {
        self.state.lock().clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Post,
    Put,
}

impl From<FormMethod> for Method {
    fn from(m: FormMethod) -> Self {
        match m {
            FormMethod::Post => Method::POST,
            FormMethod::Put => Method::PUT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

/// Form submission bound to one path and method.
#[derive(Debug, Clone)]
pub struct FormSubmit {
    client: ApiClient,
    path: String,
    method: FormMethod,
    state: Arc<Mutex<FormState>>,
}

impl FormSubmit {
    pub fn new(client: ApiClient, path: impl Into<String>, method: FormMethod) -> Self {
        Self {
            client,
            path: path.into(),
            method,
            state: Arc::new(Mutex::new(FormState::default())),
        }
    }

    #[instrument(skip(self, data), fields(path = %self.path, method = ?self.method))]
    pub async fn submit<B, R>(&self, data: &B) -> Option<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
            state.success = false;
        }

        let result = self
            .client
            .send::<B, R>(self.method.into(), &self.path, Some(data))
            .await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(reply) => {
                state.success = true;
                Some(reply)
            }
            Err(e) => {
                state.error = Some(describe(&e, "Failed to submit form"));
                None
            }
        }
    }

    /// Clears the outcome of the last submission.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.error = None;
        state.success = false;
    }

    pub fn snapshot(&self) -> FormState {
        self.state.lock().clone()
    }
}
