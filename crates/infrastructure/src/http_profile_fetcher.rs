//! HTTP adapter for the profile fetch capability.

use std::time::Duration;

use async_trait::async_trait;

use assent_application::{ProfileFetcher, UserProfile};
use assent_core::{AppError, AppResult};

/// Fetches profiles from the identity provider's userinfo endpoint with the
/// caller-supplied access token.
#[derive(Clone)]
pub struct HttpProfileFetcher {
    client: reqwest::Client,
    userinfo_url: String,
}

impl HttpProfileFetcher {
    /// Creates a fetcher for the configured userinfo endpoint.
    pub fn new(userinfo_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            client,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl ProfileFetcher for HttpProfileFetcher {
    async fn fetch(&self, access_token: &str) -> AppResult<UserProfile> {
        let response = self
            .client
            .get(self.userinfo_url.as_str())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call userinfo endpoint: {error}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(
                "profile access token was rejected by the identity provider".to_owned(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Unavailable(format!(
                "userinfo endpoint returned status {}",
                status.as_u16()
            )));
        }

        response.json::<UserProfile>().await.map_err(|error| {
            AppError::Unavailable(format!("failed to parse userinfo response body: {error}"))
        })
    }
}
