//! Network calls the client makes, behind a trait so the controller can be
//! driven without a server.

use async_trait::async_trait;
use pn_core::error::{AppError, Result};
use pn_core::models::{Post, PostCounters};
use pn_core::wire::{
    ActionResponse, ByNumberResponse, CreatePostRequest, ErrorBody, PostResponse, ReportRequest,
    ThreadResponse, VoteRequest,
};
use reqwest::StatusCode;
use uuid::Uuid;

use crate::config::ClientConfig;

/// Authoritative answer to a vote or report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReply {
    /// Recorded. Carries the post's counters when the server had them.
    Accepted(Option<PostCounters>),
    /// A uniqueness constraint already holds this action.
    Duplicate,
}

#[async_trait]
pub trait BoardTransport: Send + Sync {
    async fn create_post(&self, request: &CreatePostRequest) -> Result<Post>;
    /// Resolves a display number such as `#A1` or `17` to a post id.
    async fn post_by_number(&self, number: &str) -> Result<ByNumberResponse>;
    async fn thread(&self, id: Uuid) -> Result<ThreadResponse>;
    /// Any non-2xx other than 409 comes back as an `Err`.
    async fn submit_vote(&self, request: &VoteRequest) -> Result<ActionReply>;
    async fn submit_report(&self, request: &ReportRequest) -> Result<ActionReply>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

fn network_err(err: reqwest::Error) -> AppError {
    AppError::Network(err.to_string())
}

/// Maps a failed response to the error taxonomy using the server's message.
async fn status_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::BAD_REQUEST => AppError::ValidationError(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        StatusCode::NOT_FOUND => AppError::NotFound("resource".into(), message),
        s if s.is_server_error() => AppError::Store(message),
        _ => AppError::Network(format!("unexpected status {status}: {message}")),
    }
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(network_err)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_action<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<ActionReply> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(network_err)?;

        match response.status() {
            s if s.is_success() => {
                let body: ActionResponse = response.json().await.map_err(network_err)?;
                Ok(ActionReply::Accepted(body.counters))
            }
            StatusCode::CONFLICT => Ok(ActionReply::Duplicate),
            _ => Err(status_error(response).await),
        }
    }
}

#[async_trait]
impl BoardTransport for HttpTransport {
    async fn create_post(&self, request: &CreatePostRequest) -> Result<Post> {
        let response = self
            .client
            .post(self.url("/posts"))
            .json(request)
            .send()
            .await
            .map_err(network_err)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: PostResponse = response.json().await.map_err(network_err)?;
        Ok(body.post)
    }

    async fn post_by_number(&self, number: &str) -> Result<ByNumberResponse> {
        let response = self
            .client
            .get(self.url("/posts/by-number"))
            .query(&[("n", number)])
            .send()
            .await
            .map_err(network_err)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response.json().await.map_err(network_err)
    }

    async fn thread(&self, id: Uuid) -> Result<ThreadResponse> {
        let response = self
            .client
            .get(self.url(&format!("/posts/{id}")))
            .send()
            .await
            .map_err(network_err)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        response.json().await.map_err(network_err)
    }

    async fn submit_vote(&self, request: &VoteRequest) -> Result<ActionReply> {
        self.post_action("/votes", request).await
    }

    async fn submit_report(&self, request: &ReportRequest) -> Result<ActionReply> {
        self.post_action("/reports", request).await
    }
}
