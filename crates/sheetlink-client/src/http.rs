use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use sheetlink_batch::{Transport, TransportFailure};
use sheetlink_core::{BatchUpdateResponse, RemoteErrorBody, Request};
use tracing::debug;

use crate::config::ClientConfig;

#[derive(Serialize)]
struct BatchUpdateBody<'a> {
    requests: &'a [Request],
}

/// [`Transport`] speaking the `batchUpdate` JSON protocol over blocking HTTP
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    /// URL of the transactional endpoint for one spreadsheet
    pub fn endpoint(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base_url, spreadsheet_id
        )
    }
}

impl Transport for HttpTransport {
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, TransportFailure> {
        let url = self.endpoint(spreadsheet_id);
        debug!("POST {} with {} requests", url, requests.len());

        let mut call = self.client.post(&url).json(&BatchUpdateBody { requests });
        if let Some(token) = &self.access_token {
            call = call.bearer_auth(token);
        }

        let response = call
            .send()
            .map_err(|e| TransportFailure::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| TransportFailure::Decode(e.to_string()))
    }
}

/// Turn a non-2xx response into a failure.
///
/// A rate-limit status is trusted on its own. Any other status only counts as
/// a structured remote error when the body is a Sheets-style error object;
/// anything else (a proxy's HTML page, an empty body) is unreadable.
fn classify_failure(status: StatusCode, body: &str) -> TransportFailure {
    let parsed = serde_json::from_str::<RemoteErrorBody>(body).ok();
    match parsed {
        Some(parsed) => TransportFailure::status(status.as_u16(), parsed.error.message),
        None if status == StatusCode::TOO_MANY_REQUESTS => {
            TransportFailure::status(status.as_u16(), fallback_message(status, body))
        }
        None => TransportFailure::Decode(format!(
            "{} without an error body: {}",
            status,
            fallback_message(status, body)
        )),
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.to_string()
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}
