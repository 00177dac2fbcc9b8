//! Client for the remote users API.
//!
//! The remote side is a plain JSON REST service exposing the collection at
//! `/users`. Calls are one-shot: no retries, no caching. Callers decide
//! whether a failure is fatal or whether to fall back to local data.

use crate::models::User;

/// Errors from remote API calls.
#[derive(Debug)]
pub enum ApiError {
    /// The server could not be reached
    Network,
    /// The response body did not match the expected shape
    Decoding,
    /// The response could not be read
    InvalidResponse,
    /// The server answered with a non-success status
    ServerError(u16),
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network => write!(f, "Network error occurred"),
            ApiError::Decoding => write!(f, "Error decoding data"),
            ApiError::InvalidResponse => write!(f, "Invalid server response"),
            ApiError::ServerError(code) => {
                write!(f, "Server error with status code: {}", code)
            }
            ApiError::Unknown => write!(f, "Unknown error occurred"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decoding
        } else if e.is_body() {
            ApiError::InvalidResponse
        } else if e.is_timeout() || e.is_connect() || e.is_request() {
            ApiError::Network
        } else {
            ApiError::Unknown
        }
    }
}

/// HTTP client for the remote users API.
pub struct UsersApi {
    http: reqwest::Client,
    base_url: String,
}

impl UsersApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the full remote snapshot.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let response = self.http.get(self.users_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServerError(status.as_u16()));
        }
        Ok(response.json::<Vec<User>>().await?)
    }

    /// Creates a user remotely. The server echoes the record it stored.
    pub async fn create(&self, user: &User) -> Result<User, ApiError> {
        let response = self.http.post(self.users_url()).json(user).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServerError(status.as_u16()));
        }
        Ok(response.json::<User>().await?)
    }

    /// Replaces a user remotely, addressed by its id.
    pub async fn update(&self, user: &User) -> Result<User, ApiError> {
        let response = self
            .http
            .put(self.user_url(user.id))
            .json(user)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServerError(status.as_u16()));
        }
        Ok(response.json::<User>().await?)
    }

    /// Deletes a user remotely. Returns `true` when the server accepted
    /// the deletion.
    pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let response = self.http.delete(self.user_url(id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ServerError(status.as_u16()));
        }
        Ok(true)
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url.trim_end_matches('/'))
    }

    fn user_url(&self, id: i64) -> String {
        format!("{}/users/{}", self.base_url.trim_end_matches('/'), id)
    }
}
