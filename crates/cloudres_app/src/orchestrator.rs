use std::time::{Duration, Instant};

use cloudres_core::{update, AppState, AppViewModel, FileSelection, Msg, OrchestratorState};
use cloudres_engine::{EngineHandle, ServiceSettings};
use cloudres_logging::{cloudres_debug, cloudres_info};

const WAIT_SLICE: Duration = Duration::from_millis(100);

type Observer = Box<dyn FnMut(&AppViewModel)>;

/// Owns the run lifecycle state and feeds it user actions and engine events.
///
/// Every transition happens on the caller's thread inside `dispatch`, so
/// observers always see a consistent view.
pub struct RunOrchestrator {
    state: AppState,
    engine: EngineHandle,
    observers: Vec<Observer>,
}

impl RunOrchestrator {
    pub fn new(settings: ServiceSettings) -> Self {
        cloudres_info!("Using analysis service at {}", settings.base_url());
        Self {
            state: AppState::new(),
            engine: EngineHandle::new(settings),
            observers: Vec::new(),
        }
    }

    /// Registers a callback invoked with the new view after every visible change.
    pub fn subscribe(&mut self, observer: impl FnMut(&AppViewModel) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> &OrchestratorState {
        self.state.phase()
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn select_files(&mut self, selection: FileSelection) {
        self.dispatch(Msg::FilesSelected(selection));
    }

    pub fn submit(&mut self) {
        self.dispatch(Msg::SubmitClicked);
    }

    pub fn lookup(&mut self, run_id: &str) {
        self.dispatch(Msg::LookupRequested(run_id.to_string()));
    }

    pub fn check_now(&mut self) {
        self.dispatch(Msg::CheckNowClicked);
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    /// Applies every engine event already queued. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(event.into_msg());
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for the next engine event, then drains the queue.
    /// Returns false if nothing arrived.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.engine.recv_timeout(timeout) {
            Some(event) => {
                self.dispatch(event.into_msg());
                self.pump();
                true
            }
            None => false,
        }
    }

    /// True when the phase is terminal and no lookup is still in flight.
    pub fn is_settled(&self) -> bool {
        self.state.phase().is_settled() && self.state.pending_lookup().is_none()
    }

    /// Processes engine events until settled, or until `timeout` elapses.
    /// Returns whether the orchestrator settled.
    pub fn run_until_settled(&mut self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            self.pump();
            if self.is_settled() {
                return true;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    remaining.min(WAIT_SLICE)
                }
                None => WAIT_SLICE,
            };
            self.wait_for_event(slice);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let before = self.state.phase().kind();
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        let after = state.phase().kind();
        if before != after {
            cloudres_debug!("Phase {} -> {}", before.label(), after.label());
        }

        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;

        for effect in effects {
            cloudres_debug!("Executing {:?}", effect);
            self.engine.execute(effect);
        }

        if was_dirty {
            for observer in &mut self.observers {
                observer(&view);
            }
        }
    }
}
