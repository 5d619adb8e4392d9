//! `reqwest`-backed [`AuthApi`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use stockroom_auth::{StoredCredentials, UserRecord};

use super::{ApiError, AuthApi, LoginRequest};

/// Client for the backend's `/auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    api_url: String,
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Token lifetime in seconds.
    expires_in: i64,
    user: UserRecord,
}

impl LoginResponse {
    /// Fails when `expires_in` is negative or puts the expiry outside the
    /// representable time range.
    fn into_credentials(self, now: DateTime<Utc>) -> Result<StoredCredentials, ApiError> {
        let expires_at = (self.expires_in >= 0)
            .then(|| Duration::try_seconds(self.expires_in))
            .flatten()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ApiError::Decode(format!("expires_in out of range: {}", self.expires_in))
            })?;

        Ok(StoredCredentials {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            issued_at: now,
            expires_at,
            user: self.user,
        })
    }
}

impl HttpAuthApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/{}", self.api_url, path)
    }
}

fn classify(status: StatusCode) -> Result<(), ApiError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
        StatusCode::LOCKED => Err(ApiError::Locked),
        s => Err(ApiError::Status(s.as_u16())),
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<StoredCredentials, ApiError> {
        let res = self
            .client
            .post(self.endpoint("login"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        classify(res.status())?;

        let body: LoginResponse = res
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        body.into_credentials(Utc::now())
    }

    async fn logout(&self, access_token: &str) -> Result<(), ApiError> {
        let res = self
            .client
            .post(self.endpoint("logout"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        classify(res.status())
    }
}
