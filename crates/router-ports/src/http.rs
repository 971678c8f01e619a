use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method};
use serde_json::Value;
use tracing::{debug, warn};

/// The retrying HTTP capability injected into a plugin's context (the
/// `http` field of `PluginContext` in `router-manager`).
///
/// `fire_and_forget` starts a request and does not wait for (or retry) the
/// response — the shape a fire-and-forget plugin should reach for so Phase A
/// stays bounded in time. `send_with_retry` waits for the response, retrying
/// transient failures with an exponential backoff — the shape a blocking
/// plugin should use, since its caller is already waiting for it.
///
/// Plugin authors choose which method fits their plugin's dispatch mode; the
/// capability itself does not enforce the convention.
#[derive(Clone)]
pub struct HttpCapability {
    client: Client,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpCapability {
    /// Builds a capability with a 30s per-request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
        }
    }

    /// Overrides the retry budget used by [`send_with_retry`](Self::send_with_retry).
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Starts the request and immediately returns without waiting on, or
    /// retrying, the response. Errors (including a non-2xx status) are
    /// logged and otherwise discarded.
    pub fn fire_and_forget(&self, method: Method, url: impl Into<String>, body: Option<Value>) {
        let client = self.client.clone();
        let url = url.into();
        tokio::spawn(async move {
            let mut req = client.request(method, &url);
            if let Some(body) = &body {
                req = req.json(body);
            }
            match req.send().await {
                Ok(resp) if !resp.status().is_success() => {
                    warn!(url = %url, status = %resp.status(), "fire-and-forget request returned non-success status");
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "fire-and-forget request failed");
                }
                Ok(_) => {}
            }
        });
    }

    /// Sends the request, retrying transient failures (network errors and
    /// 5xx responses) up to `max_retries` times with exponential backoff.
    pub async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut attempt = 0;
        loop {
            let mut req = self.client.request(method.clone(), url);
            if let Some(body) = &body {
                req = req.json(body);
            }
            let result = req.send().await;
            let should_retry = match &result {
                Ok(resp) => resp.status().is_server_error(),
                Err(err) => !err.is_status(),
            };

            if !should_retry || attempt >= self.max_retries {
                return result;
            }

            attempt += 1;
            let backoff = self.base_backoff * 2u32.pow(attempt - 1);
            debug!(url = %url, attempt, ?backoff, "retrying request");
            tokio::time::sleep(backoff).await;
        }
    }
}

impl Default for HttpCapability {
    fn default() -> Self {
        Self::new()
    }
}
