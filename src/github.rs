use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::querier::Querier;

const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

pub struct GitHub {
    client: Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Api(err.to_string())
    }
}

#[derive(Deserialize)]
struct GraphqlEnvelope {
    data: Option<Value>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

impl GitHub {
    pub fn new(token: String) -> Result<Self> {
        Self::with_endpoint(token, GRAPHQL_ENDPOINT.to_string())
    }

    pub fn with_endpoint(token: String, endpoint: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("problemas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

#[async_trait]
impl Querier for GitHub {
    async fn query(&self, query: &str, variables: Value) -> Result<Value> {
        tracing::debug!(endpoint = %self.endpoint, "graphql query");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AppError::Api(format!(
                "HTTP {}: {}",
                status,
                truncate_for_error(&text)
            )));
        }

        let envelope: GraphqlEnvelope = response.json().await?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::Api(message));
        }

        envelope
            .data
            .ok_or_else(|| AppError::Api("response did not include a data payload".to_string()))
    }
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_string()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}
