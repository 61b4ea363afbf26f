use cloudres_core::{
    update, AppState, FetchOrigin, FetchOutcome, FileDescriptor, FileSelection, Msg, RunId,
    UploadProgress,
};

fn run(id: &str) -> RunId {
    RunId::new(id).unwrap()
}

fn processing() -> AppState {
    let files = FileSelection::new(vec![FileDescriptor::new("a.fastq.gz", 10)]);
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (mut state, _) = update(
        state,
        Msg::UploadFinished {
            upload_id: 1,
            result: Ok(run("r1")),
        },
    );
    state.consume_dirty();
    state
}

/// Engine events that refer to nothing the state is tracking.
fn stray_events() -> Vec<Msg> {
    vec![
        Msg::StatusUpdated {
            run_id: run("other"),
            status: "running".to_string(),
        },
        Msg::RunCompleted {
            run_id: run("other"),
        },
        Msg::UploadProgressed {
            upload_id: 7,
            progress: UploadProgress::new(5, 10),
        },
        Msg::UploadFinished {
            upload_id: 7,
            result: Ok(run("other")),
        },
        Msg::ResultsFetched {
            run_id: run("other"),
            origin: FetchOrigin::Completion,
            outcome: FetchOutcome::NotFound,
        },
        Msg::ResultsFetched {
            run_id: run("other"),
            origin: FetchOrigin::Lookup,
            outcome: FetchOutcome::NotFound,
        },
    ]
}

#[test]
fn stray_events_leave_state_untouched() {
    for state in [AppState::new(), processing()] {
        for msg in stray_events() {
            let (mut next, effects) = update(state.clone(), msg.clone());

            assert_eq!(state, next, "{msg:?}");
            assert!(effects.is_empty(), "{msg:?}");
            assert!(!next.consume_dirty(), "{msg:?}");
        }
    }
}

#[test]
fn check_now_outside_processing_does_nothing() {
    let (mut next, effects) = update(AppState::new(), Msg::CheckNowClicked);

    assert_eq!(next, AppState::new());
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
