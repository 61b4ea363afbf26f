use crate::{FetchOrigin, FetchOutcome, FileSelection, RunId, UploadError, UploadId, UploadProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a new set of files, replacing the previous selection.
    FilesSelected(FileSelection),
    /// User clicked Upload.
    SubmitClicked,
    /// User asked for the results of a run by identifier.
    LookupRequested(String),
    /// User clicked Check for Results while a run is processing.
    CheckNowClicked,
    /// User reset the form.
    ResetClicked,
    /// Engine progress for an upload.
    UploadProgressed {
        upload_id: UploadId,
        progress: UploadProgress,
    },
    /// Engine completion for an upload.
    UploadFinished {
        upload_id: UploadId,
        result: Result<RunId, UploadError>,
    },
    /// A poll tick returned a status.
    StatusUpdated { run_id: RunId, status: String },
    /// A poll tick returned the terminal status; the poller has stopped.
    RunCompleted { run_id: RunId },
    /// A results request finished.
    ResultsFetched {
        run_id: RunId,
        origin: FetchOrigin,
        outcome: FetchOutcome,
    },
}
