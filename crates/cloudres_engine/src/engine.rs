use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cloudres_core::{Effect, FetchOrigin, FileSelection, RunId, UploadId, UploadProgress};
use cloudres_logging::{cloudres_debug, cloudres_info, cloudres_warn};

use crate::poll::{PollHandle, PollSink, StatusPoller};
use crate::results::{ReqwestResultsFetcher, ResultsFetcher};
use crate::upload::{ProgressSink, ReqwestUploader, Uploader};
use crate::{EngineEvent, ServiceSettings};

enum EngineCommand {
    Upload {
        upload_id: UploadId,
        files: FileSelection,
    },
    StartPolling {
        run_id: RunId,
    },
    CancelPolling,
    FetchResults {
        run_id: RunId,
        origin: FetchOrigin,
    },
}

/// Executes effects on a background runtime and hands events back over a channel.
///
/// At most one poller is alive per handle: starting a poll cancels the previous one.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let uploader: Arc<dyn Uploader> = Arc::new(ReqwestUploader::new(settings.clone()));
        let fetcher: Arc<dyn ResultsFetcher> =
            Arc::new(ReqwestResultsFetcher::new(settings.clone()));
        let poller = StatusPoller::new(settings);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let _guard = runtime.enter();
            let mut active_poll: Option<PollHandle> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { run_id } => {
                        if let Some(previous) = active_poll.take() {
                            cloudres_debug!("Cancelling poller for run {}", previous.run_id());
                            previous.cancel();
                        }
                        let sink = Arc::new(ChannelPollSink::new(event_tx.clone()));
                        active_poll = Some(poller.start(run_id, sink));
                    }
                    EngineCommand::CancelPolling => {
                        if let Some(previous) = active_poll.take() {
                            cloudres_debug!("Cancelling poller for run {}", previous.run_id());
                            previous.cancel();
                        }
                    }
                    EngineCommand::Upload { upload_id, files } => {
                        let uploader = uploader.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_upload(uploader.as_ref(), upload_id, files, event_tx).await;
                        });
                    }
                    EngineCommand::FetchResults { run_id, origin } => {
                        let fetcher = fetcher.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let outcome = fetcher.fetch(&run_id).await;
                            let _ = event_tx.send(EngineEvent::ResultsFetched {
                                run_id,
                                origin,
                                outcome,
                            });
                        });
                    }
                }
            }
            // The owner went away; make sure no poller outlives it.
            drop(active_poll);
        });

        Self { cmd_tx, event_rx }
    }

    pub fn execute(&self, effect: Effect) {
        let command = match effect {
            Effect::Upload { upload_id, files } => EngineCommand::Upload { upload_id, files },
            Effect::StartPolling { run_id } => EngineCommand::StartPolling { run_id },
            Effect::CancelPolling => EngineCommand::CancelPolling,
            Effect::FetchResults { run_id, origin } => {
                EngineCommand::FetchResults { run_id, origin }
            }
        };
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_upload(
    uploader: &dyn Uploader,
    upload_id: UploadId,
    files: FileSelection,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelProgressSink::new(upload_id, event_tx.clone());
    let result = uploader.upload(&files, &sink).await;
    match &result {
        Ok(run_id) => cloudres_info!("Upload {} started run {}", upload_id, run_id),
        Err(err) => cloudres_warn!("Upload {} failed: {}", upload_id, err),
    }
    let _ = event_tx.send(EngineEvent::UploadFinished { upload_id, result });
}

struct ChannelProgressSink {
    upload_id: UploadId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    fn new(upload_id: UploadId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { upload_id, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, progress: UploadProgress) {
        let _ = self.tx.send(EngineEvent::UploadProgress {
            upload_id: self.upload_id,
            progress,
        });
    }
}

struct ChannelPollSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelPollSink {
    fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl PollSink for ChannelPollSink {
    fn on_update(&self, run_id: &RunId, status: &str) {
        let _ = self.tx.send(EngineEvent::StatusUpdated {
            run_id: run_id.clone(),
            status: status.to_string(),
        });
    }

    fn on_terminal(&self, run_id: &RunId) {
        let _ = self.tx.send(EngineEvent::RunCompleted {
            run_id: run_id.clone(),
        });
    }
}
