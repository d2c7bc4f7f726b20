use anyhow::{Context, Result, anyhow, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Body of a GraphQL POST request.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Returns the payload, or the server-reported errors.
    ///
    /// # Errors
    /// Returns an error if the response carries GraphQL errors or no data.
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            bail!("subgraph returned errors: {}", messages.join("; "));
        }
        self.data
            .ok_or_else(|| anyhow!("subgraph response carried no data"))
    }
}

/// HTTP client bound to one subgraph endpoint.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    /// Creates a client for `url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building subgraph HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Runs a query and deserializes its `data` field.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, an
    /// undecodable body, or GraphQL-level errors.
    pub async fn query<V, T>(&self, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(url = %self.redacted_url(), "subgraph query");

        let response: GraphQlResponse<T> = self
            .http
            .post(&self.url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .context("sending subgraph request")?
            .error_for_status()
            .context("subgraph request failed")?
            .json()
            .await
            .context("decoding subgraph response")?;

        response.into_data()
    }

    /// Endpoint with any gateway API key masked, for logging.
    fn redacted_url(&self) -> String {
        match self.url.split_once("/api/") {
            Some((host, rest)) => match rest.split_once('/') {
                Some((_, path)) => format!("{host}/api/***/{path}"),
                None => format!("{host}/api/***"),
            },
            None => self.url.clone(),
        }
    }
}
