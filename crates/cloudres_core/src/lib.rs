//! CloudRes core: pure run-lifecycle state machine, results decoding and view-model helpers.
mod classify;
mod effect;
mod error;
mod msg;
mod state;
mod tabular;
mod types;
mod update;
mod view_model;

pub use classify::{classify, looks_like_html, FetchOutcome, RawResponse, HTML_PAYLOAD_MESSAGE};
pub use effect::{Effect, FetchOrigin, UploadId};
pub use error::UploadError;
pub use msg::Msg;
pub use state::{AppState, OrchestratorState};
pub use tabular::{decode, ResultRecord, ResultSet};
pub use types::{
    FileDescriptor, FileSelection, RejectReason, RejectedFile, ReportKind, RunId,
    SelectionPolicy, UploadProgress, COMPLETED_STATUS,
};
pub use update::{
    failure_reason, update, MSG_CHECKING_RESULTS, MSG_ENTER_RUN_ID, MSG_FETCHING_RESULTS,
    MSG_NOT_FOUND, MSG_NO_RESULTS, MSG_PIPELINE_STARTED, MSG_RESULTS_LOADED, MSG_SELECT_FILES,
    MSG_UPLOADING, MSG_UPLOAD_IN_PROGRESS, PENDING_STATUS,
};
pub use view_model::{AppViewModel, FileRowView, PhaseKind, ResultsTableView};
