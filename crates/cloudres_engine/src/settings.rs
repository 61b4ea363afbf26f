use std::time::Duration;

use cloudres_core::{ReportKind, RunId};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub(crate) const UPLOAD_PATH: &str = "upload";
pub(crate) const STATUS_PATH: &str = "status";
pub(crate) const RESULTS_PATH: &str = "results";
const RUN_ID_PARAM: &str = "run_id";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid base url {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {0} must be an absolute http(s) url")]
    UnsupportedBaseUrl(String),
}

/// Where the analysis service lives and how often to ask it about a run.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    base_url: Url,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
}

impl ServiceSettings {
    /// Validates `base_url`. A path prefix such as `/api` is kept: endpoints
    /// are resolved below it.
    pub fn new(base_url: &str) -> Result<Self, SettingsError> {
        let mut url = Url::parse(base_url).map_err(|source| SettingsError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::UnsupportedBaseUrl(base_url.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        Ok(Self {
            base_url: url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: Duration::from_secs(10),
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint below the base url, optionally keyed by run.
    pub fn endpoint(&self, path: &str, run_id: Option<&RunId>) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(path)?;
        if let Some(run_id) = run_id {
            url.query_pairs_mut()
                .append_pair(RUN_ID_PARAM, run_id.as_str());
        }
        Ok(url)
    }

    pub fn report_url(&self, kind: ReportKind, run_id: &RunId) -> Result<Url, url::ParseError> {
        self.endpoint(kind.path(), Some(run_id))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("default base url is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_path_prefix_and_encode_run_id() {
        let settings = ServiceSettings::new("http://example.com/api").unwrap();
        let run_id = RunId::new("a b&c").unwrap();
        assert_eq!(
            settings.endpoint(RESULTS_PATH, Some(&run_id)).unwrap().as_str(),
            "http://example.com/api/results?run_id=a+b%26c"
        );
        assert_eq!(
            settings.endpoint(UPLOAD_PATH, None).unwrap().as_str(),
            "http://example.com/api/upload"
        );
    }

    #[test]
    fn report_urls_point_at_report_endpoints() {
        let settings = ServiceSettings::default();
        let run_id = RunId::new("r1").unwrap();
        assert_eq!(
            settings
                .report_url(ReportKind::MultiQc, &run_id)
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8000/multiqc_report?run_id=r1"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            ServiceSettings::new("mailto:ops@example.com"),
            Err(SettingsError::UnsupportedBaseUrl(_))
        ));
        assert!(matches!(
            ServiceSettings::new("not a url"),
            Err(SettingsError::InvalidBaseUrl { .. })
        ));
    }
}
