use crate::error::IssuesError;
use crate::fetcher::IssueSource;
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use octocrab::Octocrab;
use serde_json::Value;

/// [`IssueSource`] backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(api_base_url: &str, token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(api_base_url)
            .context("failed to set base URI")?;
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }
}

impl IssueSource for GitHubClient {
    fn fetch_json(&self, url: String) -> BoxFuture<'_, Result<Value, IssuesError>> {
        async move {
            let response = self
                .octocrab
                ._get(url)
                .await
                .map_err(|e| IssuesError::NetworkFailure(e.to_string()))?;

            // Non-2xx bodies are never decoded.
            let status = response.status();
            if !status.is_success() {
                return Err(IssuesError::NetworkFailure(status.to_string()));
            }

            let body = self
                .octocrab
                .body_to_string(response)
                .await
                .map_err(|e| IssuesError::NetworkFailure(e.to_string()))?;

            serde_json::from_str(&body).map_err(|e| IssuesError::MalformedResponse(e.to_string()))
        }
        .boxed()
    }
}
