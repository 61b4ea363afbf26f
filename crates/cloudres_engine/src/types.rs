use cloudres_core::{FetchOrigin, FetchOutcome, Msg, RunId, UploadError, UploadId, UploadProgress};

/// Everything the engine reports back to whoever owns the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress {
        upload_id: UploadId,
        progress: UploadProgress,
    },
    UploadFinished {
        upload_id: UploadId,
        result: Result<RunId, UploadError>,
    },
    StatusUpdated {
        run_id: RunId,
        status: String,
    },
    RunCompleted {
        run_id: RunId,
    },
    ResultsFetched {
        run_id: RunId,
        origin: FetchOrigin,
        outcome: FetchOutcome,
    },
}

impl EngineEvent {
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::UploadProgress {
                upload_id,
                progress,
            } => Msg::UploadProgressed {
                upload_id,
                progress,
            },
            EngineEvent::UploadFinished { upload_id, result } => {
                Msg::UploadFinished { upload_id, result }
            }
            EngineEvent::StatusUpdated { run_id, status } => Msg::StatusUpdated { run_id, status },
            EngineEvent::RunCompleted { run_id } => Msg::RunCompleted { run_id },
            EngineEvent::ResultsFetched {
                run_id,
                origin,
                outcome,
            } => Msg::ResultsFetched {
                run_id,
                origin,
                outcome,
            },
        }
    }
}
