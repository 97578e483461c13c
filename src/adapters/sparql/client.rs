use crate::domain::ports::{Bindings, GraphStoreClient};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

/// SPARQL 1.1 protocol client: form-encoded POSTs, JSON result sets.
#[derive(Debug, Clone)]
pub struct HttpGraphStoreClient {
    client: Client,
    query_endpoint: String,
    update_endpoint: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl HttpGraphStoreClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client: Client::new(),
            query_endpoint: endpoint.clone(),
            update_endpoint: endpoint,
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_update_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.update_endpoint = endpoint.into();
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn post_form(&self, endpoint: &str, key: &str, body: &str, accept: &str) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, accept)
            .form(&[(key, body)]);

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SyncError::store(format!(
                "{} {} returned {}: {}",
                key,
                endpoint,
                status,
                text.trim()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl GraphStoreClient for HttpGraphStoreClient {
    async fn query(&self, query: &str) -> Result<Bindings> {
        tracing::trace!("SPARQL query:\n{}", query);
        let response = self
            .post_form(
                &self.query_endpoint,
                "query",
                query,
                "application/sparql-results+json",
            )
            .await?;

        let results: SparqlResults = serde_json::from_str(&response.text().await?)?;
        Ok(results
            .results
            .bindings
            .into_iter()
            .map(|row| row.into_iter().map(|(k, term)| (k, term.value)).collect())
            .collect())
    }

    async fn update(&self, update: &str) -> Result<()> {
        tracing::trace!("SPARQL update:\n{}", update);
        self.post_form(&self.update_endpoint, "update", update, "application/json")
            .await?;
        Ok(())
    }
}
