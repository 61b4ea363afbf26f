use crate::view_model::{AppViewModel, FileRowView, PhaseKind, ResultsTableView};
use crate::{FileSelection, ReportKind, ResultSet, RunId, UploadId, UploadProgress};

/// Where the run lifecycle currently stands. Exactly one phase is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    FilesSelected,
    Uploading(UploadProgress),
    Processing {
        run_id: RunId,
        last_message: String,
    },
    ResultsReady {
        run_id: RunId,
        results: ResultSet,
    },
    Failed {
        reason: String,
    },
}

impl OrchestratorState {
    pub fn kind(&self) -> PhaseKind {
        match self {
            OrchestratorState::Idle => PhaseKind::Idle,
            OrchestratorState::FilesSelected => PhaseKind::FilesSelected,
            OrchestratorState::Uploading(_) => PhaseKind::Uploading,
            OrchestratorState::Processing { .. } => PhaseKind::Processing,
            OrchestratorState::ResultsReady { .. } => PhaseKind::ResultsReady,
            OrchestratorState::Failed { .. } => PhaseKind::Failed,
        }
    }

    /// True once nothing further will happen without user action.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            OrchestratorState::ResultsReady { .. } | OrchestratorState::Failed { .. }
        )
    }
}

/// Everything the orchestrator owns: the phase plus the data that outlives a
/// single phase (selection, current run, user message).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    phase: OrchestratorState,
    selection: FileSelection,
    run_id: Option<RunId>,
    message: String,
    upload_seq: UploadId,
    pending_lookup: Option<RunId>,
    polling: Option<RunId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &OrchestratorState {
        &self.phase
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    /// The run a poller is expected to be running for, if any.
    pub fn polling(&self) -> Option<&RunId> {
        self.polling.as_ref()
    }

    pub fn pending_lookup(&self) -> Option<&RunId> {
        self.pending_lookup.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let upload_percent = match &self.phase {
            OrchestratorState::Uploading(progress) => Some(progress.percent()),
            _ => None,
        };
        let results = match &self.phase {
            OrchestratorState::ResultsReady { results, .. } => Some(ResultsTableView {
                columns: results.columns().to_vec(),
                rows: results
                    .records()
                    .iter()
                    .map(|record| {
                        results
                            .columns()
                            .iter()
                            .map(|column| record.get(column).unwrap_or_default().to_string())
                            .collect()
                    })
                    .collect(),
            }),
            _ => None,
        };
        let reports = if self.run_id.is_some() {
            ReportKind::ALL.to_vec()
        } else {
            Vec::new()
        };

        AppViewModel {
            phase: self.phase.kind(),
            message: self.message.clone(),
            run_id: self.run_id.as_ref().map(ToString::to_string),
            files: self
                .selection
                .iter()
                .map(|file| FileRowView {
                    name: file.name.clone(),
                    byte_size: file.byte_size,
                })
                .collect(),
            upload_percent,
            results,
            reports,
            can_submit: !self.selection.is_empty()
                && !matches!(self.phase, OrchestratorState::Uploading(_)),
            can_check_now: matches!(self.phase, OrchestratorState::Processing { .. }),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: OrchestratorState) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.mark_dirty();
    }

    pub(crate) fn set_selection(&mut self, selection: FileSelection) {
        self.selection = selection;
        self.mark_dirty();
    }

    pub(crate) fn set_run_id(&mut self, run_id: Option<RunId>) {
        self.run_id = run_id;
        self.mark_dirty();
    }

    pub(crate) fn next_upload_id(&mut self) -> UploadId {
        self.upload_seq += 1;
        self.upload_seq
    }

    pub(crate) fn current_upload_id(&self) -> UploadId {
        self.upload_seq
    }

    pub(crate) fn set_pending_lookup(&mut self, run_id: Option<RunId>) {
        self.pending_lookup = run_id;
    }

    pub(crate) fn set_polling(&mut self, run_id: Option<RunId>) {
        self.polling = run_id;
    }

    /// True when `run_id` is the run currently being processed.
    pub(crate) fn is_processing(&self, run_id: &RunId) -> bool {
        matches!(&self.phase, OrchestratorState::Processing { run_id: current, .. } if current == run_id)
    }
}
