use crate::domain::ports::SnippetSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Plain GET of raw text files (snippets, command lists).
#[derive(Debug, Clone, Default)]
pub struct HttpSnippetSource {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpSnippetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl SnippetSource for HttpSnippetSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
