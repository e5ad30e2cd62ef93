//! GraphQL transport to the GitHub API.
//!
//! The sync flow talks to GitHub through a single `execute` seam so tests
//! can script responses without a network. Every call is attempted exactly
//! once; retries are a caller policy this crate deliberately does not have.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::GatewayError;

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const USER_AGENT: &str = "project-sync";

/// Abstraction over GraphQL execution for testability.
/// Real implementation: `GitHubGateway`. Test double: `mock::MockGateway`.
#[async_trait]
pub trait GraphQlGateway: Send + Sync {
    /// Execute one query or mutation document and return the response's
    /// `data` object.
    async fn execute(&self, document: &str, variables: Value) -> Result<Value, GatewayError>;
}

/// The GraphQL response envelope: `data` on success, a non-empty `errors`
/// array otherwise (possibly alongside partial data, which we discard).
#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
}

/// A GraphQL connection: the `nodes` list is all this crate ever pages over.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

/// Deserialize a `data` object into a typed response, tagging failures with
/// the operation they came from.
pub(crate) fn decode<T: DeserializeOwned>(data: Value, operation: &str) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|err| GatewayError::MalformedResponse {
        context: format!("{operation}: {err}"),
    })
}

fn unwrap_envelope(envelope: ResponseEnvelope) -> Result<Value, GatewayError> {
    if let Some(entry) = envelope.errors.first() {
        return Err(GatewayError::Api {
            message: entry.message.clone(),
        });
    }
    envelope.data.ok_or_else(|| GatewayError::MalformedResponse {
        context: "envelope carried neither data nor errors".to_string(),
    })
}

/// reqwest-backed gateway against the production GitHub GraphQL endpoint.
pub struct GitHubGateway {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl GitHubGateway {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            endpoint: GITHUB_GRAPHQL_URL.to_string(),
        }
    }
}

#[async_trait]
impl GraphQlGateway for GitHubGateway {
    async fn execute(&self, document: &str, variables: Value) -> Result<Value, GatewayError> {
        let envelope: ResponseEnvelope = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .json(&serde_json::json!({
                "query": document,
                "variables": variables,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_envelope(envelope)
    }
}
