use crate::{
    AppState, Effect, FetchOrigin, FetchOutcome, FileSelection, Msg, OrchestratorState, RunId,
    UploadError, UploadId, UploadProgress,
};

pub const MSG_SELECT_FILES: &str = "Please select files to upload.";
pub const MSG_ENTER_RUN_ID: &str = "Please enter a run ID.";
pub const MSG_UPLOADING: &str = "Uploading files...";
pub const MSG_UPLOAD_IN_PROGRESS: &str =
    "An upload is in progress. Look up another run once it has finished.";
pub const MSG_PIPELINE_STARTED: &str =
    "Upload complete. Pipeline processing... (this may take around 10-15 minutes)";
pub const MSG_FETCHING_RESULTS: &str = "Pipeline complete! Fetching results...";
pub const MSG_CHECKING_RESULTS: &str = "Checking for results...";
pub const MSG_RESULTS_LOADED: &str = "Pipeline complete! Results loaded.";
pub const MSG_NO_RESULTS: &str = "No meaningful results found in the response.";
pub const MSG_NOT_FOUND: &str =
    "Results not found. Please ensure the pipeline has completed successfully.";
/// Status shown for a freshly started run before the first poll answers.
pub const PENDING_STATUS: &str = "pending";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(selection) => select_files(&mut state, selection),
        Msg::SubmitClicked => submit(&mut state),
        Msg::LookupRequested(raw) => request_lookup(&mut state, &raw),
        Msg::CheckNowClicked => check_now(&mut state),
        Msg::ResetClicked => {
            let effects = stop_polling(&mut state);
            state.set_pending_lookup(None);
            state.set_run_id(None);
            state.set_message("");
            let phase = if state.selection().is_empty() {
                OrchestratorState::Idle
            } else {
                OrchestratorState::FilesSelected
            };
            state.set_phase(phase);
            effects
        }
        Msg::UploadProgressed {
            upload_id,
            progress,
        } => {
            apply_upload_progress(&mut state, upload_id, progress);
            Vec::new()
        }
        Msg::UploadFinished { upload_id, result } => finish_upload(&mut state, upload_id, result),
        Msg::StatusUpdated { run_id, status } => {
            if state.is_processing(&run_id) && state.polling() == Some(&run_id) {
                state.set_message(format!("Pipeline status: {status}..."));
                state.set_phase(OrchestratorState::Processing {
                    run_id,
                    last_message: status,
                });
            }
            Vec::new()
        }
        Msg::RunCompleted { run_id } => {
            if state.is_processing(&run_id) && state.polling() == Some(&run_id) {
                // The poller stops by itself after the terminal status.
                state.set_polling(None);
                state.set_message(MSG_FETCHING_RESULTS);
                vec![Effect::FetchResults {
                    run_id,
                    origin: FetchOrigin::Completion,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::ResultsFetched {
            run_id,
            origin,
            outcome,
        } => match origin {
            FetchOrigin::Lookup => apply_lookup_outcome(&mut state, run_id, outcome),
            FetchOrigin::Completion | FetchOrigin::CheckNow => {
                apply_run_outcome(&mut state, run_id, origin, outcome)
            }
        },
    };

    (state, effects)
}

fn select_files(state: &mut AppState, selection: FileSelection) -> Vec<Effect> {
    let effects = stop_polling(state);
    state.set_pending_lookup(None);
    state.set_run_id(None);
    state.set_message("");
    let phase = if selection.is_empty() {
        OrchestratorState::Idle
    } else {
        OrchestratorState::FilesSelected
    };
    state.set_selection(selection);
    state.set_phase(phase);
    effects
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if matches!(state.phase(), OrchestratorState::Uploading(_)) {
        return Vec::new();
    }
    if state.selection().is_empty() {
        state.set_message(MSG_SELECT_FILES);
        return Vec::new();
    }

    let mut effects = stop_polling(state);
    state.set_pending_lookup(None);
    state.set_run_id(None);
    let files = state.selection().clone();
    let upload_id = state.next_upload_id();
    state.set_phase(OrchestratorState::Uploading(UploadProgress::new(
        0,
        files.total_bytes(),
    )));
    state.set_message(MSG_UPLOADING);
    effects.push(Effect::Upload { upload_id, files });
    effects
}

fn request_lookup(state: &mut AppState, raw: &str) -> Vec<Effect> {
    // The upload's run id is not known yet; a lookup now would strand it.
    if matches!(state.phase(), OrchestratorState::Uploading(_)) {
        state.set_message(MSG_UPLOAD_IN_PROGRESS);
        return Vec::new();
    }
    let Some(run_id) = RunId::new(raw.trim()) else {
        state.set_message(MSG_ENTER_RUN_ID);
        return Vec::new();
    };
    state.set_pending_lookup(Some(run_id.clone()));
    state.set_message(format!("Looking up run {run_id}..."));
    vec![Effect::FetchResults {
        run_id,
        origin: FetchOrigin::Lookup,
    }]
}

fn check_now(state: &mut AppState) -> Vec<Effect> {
    let run_id = match state.phase() {
        OrchestratorState::Processing { run_id, .. } => run_id.clone(),
        _ => return Vec::new(),
    };
    state.set_message(MSG_CHECKING_RESULTS);
    vec![Effect::FetchResults {
        run_id,
        origin: FetchOrigin::CheckNow,
    }]
}

fn apply_upload_progress(state: &mut AppState, upload_id: UploadId, progress: UploadProgress) {
    if upload_id != state.current_upload_id() {
        return;
    }
    let current = match state.phase() {
        OrchestratorState::Uploading(current) => *current,
        _ => return,
    };
    if progress.transferred >= current.transferred {
        state.set_phase(OrchestratorState::Uploading(progress));
    }
}

fn finish_upload(
    state: &mut AppState,
    upload_id: UploadId,
    result: Result<RunId, UploadError>,
) -> Vec<Effect> {
    if upload_id != state.current_upload_id()
        || !matches!(state.phase(), OrchestratorState::Uploading(_))
    {
        return Vec::new();
    }

    match result {
        Ok(run_id) => {
            state.set_run_id(Some(run_id.clone()));
            state.set_message(MSG_PIPELINE_STARTED);
            start_processing(state, run_id, PENDING_STATUS.to_string())
        }
        Err(err) => {
            fail(state, format!("Upload failed: {err}"));
            Vec::new()
        }
    }
}

fn apply_run_outcome(
    state: &mut AppState,
    run_id: RunId,
    origin: FetchOrigin,
    outcome: FetchOutcome,
) -> Vec<Effect> {
    if !state.is_processing(&run_id) {
        return Vec::new();
    }

    match outcome {
        FetchOutcome::Ready(results) => {
            let effects = stop_polling(state);
            state.set_message(MSG_RESULTS_LOADED);
            state.set_phase(OrchestratorState::ResultsReady { run_id, results });
            effects
        }
        FetchOutcome::Empty => {
            let effects = stop_polling(state);
            state.set_message(MSG_NO_RESULTS);
            state.set_phase(OrchestratorState::ResultsReady {
                run_id,
                results: Default::default(),
            });
            effects
        }
        FetchOutcome::NotReady(body) => {
            state.set_message(body.clone());
            if state.polling().is_none() {
                // The poller stopped on the terminal status; keep retrying on the same cadence.
                start_processing(state, run_id, body)
            } else {
                state.set_phase(OrchestratorState::Processing {
                    run_id,
                    last_message: body,
                });
                Vec::new()
            }
        }
        failure => {
            let reason = failure_reason(&failure);
            if origin == FetchOrigin::CheckNow {
                // The run is still tracked; the next tick may succeed.
                state.set_message(reason);
                Vec::new()
            } else {
                let effects = stop_polling(state);
                fail(state, reason);
                effects
            }
        }
    }
}

fn apply_lookup_outcome(state: &mut AppState, run_id: RunId, outcome: FetchOutcome) -> Vec<Effect> {
    if state.pending_lookup() != Some(&run_id) {
        return Vec::new();
    }
    state.set_pending_lookup(None);

    match outcome {
        FetchOutcome::Ready(results) => {
            let effects = stop_polling(state);
            state.set_run_id(Some(run_id.clone()));
            state.set_message(MSG_RESULTS_LOADED);
            state.set_phase(OrchestratorState::ResultsReady { run_id, results });
            effects
        }
        FetchOutcome::Empty => {
            let effects = stop_polling(state);
            state.set_run_id(Some(run_id.clone()));
            state.set_message(MSG_NO_RESULTS);
            state.set_phase(OrchestratorState::ResultsReady {
                run_id,
                results: Default::default(),
            });
            effects
        }
        FetchOutcome::NotReady(body) => {
            // A known run that is still going: track it like a fresh upload.
            state.set_run_id(Some(run_id.clone()));
            state.set_message(body.clone());
            start_processing(state, run_id, body)
        }
        failure => {
            let effects = stop_polling(state);
            fail(state, failure_reason(&failure));
            effects
        }
    }
}

/// Enters `Processing` for `run_id` and (re)starts its poller, cancelling any other first.
fn start_processing(state: &mut AppState, run_id: RunId, last_message: String) -> Vec<Effect> {
    let mut effects = stop_polling(state);
    state.set_polling(Some(run_id.clone()));
    state.set_phase(OrchestratorState::Processing {
        run_id: run_id.clone(),
        last_message,
    });
    effects.push(Effect::StartPolling { run_id });
    effects
}

fn stop_polling(state: &mut AppState) -> Vec<Effect> {
    if state.polling().is_some() {
        state.set_polling(None);
        vec![Effect::CancelPolling]
    } else {
        Vec::new()
    }
}

fn fail(state: &mut AppState, reason: String) {
    state.set_message(reason.clone());
    state.set_phase(OrchestratorState::Failed { reason });
}

/// User-facing text for an outcome that ends the attempt to show results.
pub fn failure_reason(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::NotFound => MSG_NOT_FOUND.to_string(),
        FetchOutcome::HttpError {
            status,
            status_text,
        } => format!("Error fetching results: {status} {status_text}"),
        FetchOutcome::TransportError(message) => format!("Error fetching results: {message}"),
        FetchOutcome::DecodeError(message) => format!("Error parsing results: {message}"),
        FetchOutcome::NotReady(body) => body.clone(),
        FetchOutcome::Empty => MSG_NO_RESULTS.to_string(),
        FetchOutcome::Ready(_) => MSG_RESULTS_LOADED.to_string(),
    }
}
