use cloudres_core::{classify, FetchOutcome, RawResponse, RunId};
use cloudres_logging::{cloudres_debug, cloudres_info, cloudres_warn, preview};
use reqwest::header::CONTENT_TYPE;

use crate::settings::{ServiceSettings, RESULTS_PATH};
use crate::text::decode_body;

/// Also used for lookups: the identifier does not have to come from an upload.
#[async_trait::async_trait]
pub trait ResultsFetcher: Send + Sync {
    async fn fetch(&self, run_id: &RunId) -> FetchOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestResultsFetcher {
    settings: ServiceSettings,
}

impl ReqwestResultsFetcher {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl ResultsFetcher for ReqwestResultsFetcher {
    async fn fetch(&self, run_id: &RunId) -> FetchOutcome {
        let url = match self.settings.endpoint(RESULTS_PATH, Some(run_id)) {
            Ok(url) => url,
            Err(err) => return FetchOutcome::TransportError(err.to_string()),
        };
        let client = match self.settings.build_client() {
            Ok(client) => client,
            Err(err) => return FetchOutcome::TransportError(err.to_string()),
        };

        cloudres_debug!("Fetching results for run {} from {}", run_id, url);
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                cloudres_warn!("Results request for run {} failed: {}", run_id, err);
                return FetchOutcome::TransportError(err.to_string());
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return FetchOutcome::TransportError(err.to_string()),
        };

        let body = match decode_body(&bytes, content_type.as_deref()) {
            Ok(text) => text,
            Err(err) if status.is_success() => return FetchOutcome::DecodeError(err.to_string()),
            // Error pages only feed the status branches; a lossy read is enough.
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        cloudres_debug!(
            "Results response {} ({:?}): {}",
            status,
            content_type,
            preview(&body, 100)
        );

        let outcome = classify(&RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default(),
            content_type: content_type.as_deref(),
            body: &body,
        });
        cloudres_info!("Results for run {}: {}", run_id, outcome.kind());
        outcome
    }
}
