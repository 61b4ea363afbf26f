use crate::ReportKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    FilesSelected,
    Uploading,
    Processing,
    ResultsReady,
    Failed,
}

impl PhaseKind {
    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Idle => "Idle",
            PhaseKind::FilesSelected => "Files selected",
            PhaseKind::Uploading => "Uploading",
            PhaseKind::Processing => "Processing",
            PhaseKind::ResultsReady => "Results ready",
            PhaseKind::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: PhaseKind,
    pub message: String,
    pub run_id: Option<String>,
    pub files: Vec<FileRowView>,
    pub upload_percent: Option<u8>,
    pub results: Option<ResultsTableView>,
    pub reports: Vec<ReportKind>,
    pub can_submit: bool,
    pub can_check_now: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub byte_size: u64,
}

/// Results laid out for a table: one row per record, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
