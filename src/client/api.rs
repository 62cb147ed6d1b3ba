use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::auth::{AuthResponse, AuthStatus, RegisterRequest};
use crate::models::{ApiResponse, NewTask, SessionUser, Task, TaskList, TaskPatch};

#[derive(Debug)]
pub enum ClientError {
    /// The request never got a response.
    Network(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, message: String },
    /// The response body was not what was expected.
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Status { status, message } => {
                write!(f, "Request failed ({}): {}", status, message)
            }
            ClientError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ClientError::Decode(error.to_string())
        } else {
            ClientError::Network(error.to_string())
        }
    }
}

/// The task endpoints the client-side controller depends on.
#[async_trait(?Send)]
pub trait TaskApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError>;
    async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError>;
    async fn delete_task(&self, id: i64) -> Result<(), ClientError>;
    async fn fetch_task_lists(&self) -> Result<Vec<TaskList>, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the API. Keeps the session cookie between calls, so
/// `login` must succeed before the task endpoints can be used.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        let body: AuthResponse = read_json(response).await?;
        Ok(body.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: AuthResponse = read_json(response).await?;
        Ok(body.user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/auth/logout")).send().await?;
        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }

    pub async fn check(&self) -> Result<AuthStatus, ClientError> {
        let response = self.http.get(self.url("/auth/check")).send().await?;
        read_json(response).await
    }

    async fn send_data<T, B>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let envelope: ApiResponse<T> = read_json(request.send().await?).await?;
        Ok(envelope.data)
    }
}

#[async_trait(?Send)]
impl TaskApi for ApiClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.send_data::<_, ()>(reqwest::Method::GET, "/tasks", None)
            .await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.send_data(reqwest::Method::POST, "/tasks", Some(task))
            .await
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.send_data(reqwest::Method::PUT, &format!("/tasks/{}", id), Some(patch))
            .await
    }

    async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/tasks/{}", id)))
            .send()
            .await?;
        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }

    async fn fetch_task_lists(&self) -> Result<Vec<TaskList>, ClientError> {
        self.send_data::<_, ()>(reqwest::Method::GET, "/task-lists", None)
            .await
    }
}

/// Decodes a 2xx body as `T`; anything else becomes `ClientError::Status`
/// carrying the server's `{"error": ...}` message when there is one.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
