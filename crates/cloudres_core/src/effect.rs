use crate::{FileSelection, RunId};

/// Identifies one submitted upload so late events from a superseded one can be ignored.
pub type UploadId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// The poller saw the terminal status.
    Completion,
    /// The user asked for results without waiting for the next tick.
    CheckNow,
    /// The user supplied an identifier directly.
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Upload {
        upload_id: UploadId,
        files: FileSelection,
    },
    /// Replaces any running poller with one for `run_id`.
    StartPolling { run_id: RunId },
    CancelPolling,
    FetchResults { run_id: RunId, origin: FetchOrigin },
}
