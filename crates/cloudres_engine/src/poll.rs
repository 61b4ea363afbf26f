use std::sync::{Arc, Mutex};
use std::time::Duration;

use cloudres_core::{RunId, COMPLETED_STATUS};
use cloudres_logging::{cloudres_debug, cloudres_info, cloudres_warn};
use serde::Deserialize;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::settings::{ServiceSettings, STATUS_PATH};

pub trait PollSink: Send + Sync {
    /// Every status the service reported, terminal or not.
    fn on_update(&self, run_id: &RunId, status: &str);
    /// The terminal status was seen; called once, after the matching `on_update`.
    fn on_terminal(&self, run_id: &RunId);
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("status request failed: {0}")]
    Transport(String),
    #[error("status request returned {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("status response unreadable: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

/// Closes once; after `close` returns no callback guarded by `run_if_open` runs.
#[derive(Debug)]
struct Gate {
    open: Mutex<bool>,
}

impl Gate {
    fn new() -> Self {
        Self {
            open: Mutex::new(true),
        }
    }

    fn close(&self) {
        if let Ok(mut open) = self.open.lock() {
            *open = false;
        }
    }

    fn run_if_open(&self, f: impl FnOnce()) -> bool {
        match self.open.lock() {
            Ok(open) if *open => {
                f();
                true
            }
            _ => false,
        }
    }
}

/// Handle to one running poller. Dropping it cancels the poller.
#[derive(Debug)]
pub struct PollHandle {
    run_id: RunId,
    token: CancellationToken,
    gate: Arc<Gate>,
}

impl PollHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Stops polling. Idempotent, and safe after the poller finished by itself.
    pub fn cancel(&self) {
        self.gate.close();
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Queries `/status` on a fixed interval until the run completes.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    settings: ServiceSettings,
}

impl StatusPoller {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }

    pub fn interval(&self) -> Duration {
        self.settings.poll_interval
    }

    /// Spawns the poll loop on the current tokio runtime. The first query is
    /// issued one interval after this call.
    pub fn start(&self, run_id: RunId, sink: Arc<dyn PollSink>) -> PollHandle {
        let token = CancellationToken::new();
        let gate = Arc::new(Gate::new());
        let handle = PollHandle {
            run_id: run_id.clone(),
            token: token.clone(),
            gate: gate.clone(),
        };

        let poller = self.clone();
        tokio::spawn(async move {
            poller.run(run_id, sink, token, gate).await;
        });
        handle
    }

    async fn run(
        &self,
        run_id: RunId,
        sink: Arc<dyn PollSink>,
        token: CancellationToken,
        gate: Arc<Gate>,
    ) {
        let period = self.settings.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        cloudres_info!("Polling status of run {} every {:?}", run_id, period);

        let client = match self.settings.build_client() {
            Ok(client) => client,
            Err(err) => {
                cloudres_warn!("Cannot build http client for polling {}: {}", run_id, err);
                return;
            }
        };

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = self.query(&client, &run_id) => result,
            };

            match result {
                Ok(status) => {
                    cloudres_debug!("Run {} status: {}", run_id, status);
                    let terminal = status == COMPLETED_STATUS;
                    let delivered = gate.run_if_open(|| {
                        sink.on_update(&run_id, &status);
                        if terminal {
                            sink.on_terminal(&run_id);
                        }
                    });
                    if !delivered || terminal {
                        break;
                    }
                }
                // Transient failures are tolerated; the next tick tries again.
                Err(err) => cloudres_warn!("Status check for run {} failed: {}", run_id, err),
            }
        }
        cloudres_debug!("Stopped polling run {}", run_id);
    }

    async fn query(&self, client: &reqwest::Client, run_id: &RunId) -> Result<String, PollError> {
        let url = self
            .settings
            .endpoint(STATUS_PATH, Some(run_id))
            .map_err(|err| PollError::Transport(err.to_string()))?;
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| PollError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| PollError::Transport(err.to_string()))?;
        let parsed: StatusResponse =
            serde_json::from_slice(&body).map_err(|err| PollError::Malformed(err.to_string()))?;
        Ok(parsed.status)
    }
}
