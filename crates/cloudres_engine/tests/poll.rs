use std::sync::{Arc, Mutex};
use std::time::Duration;

use cloudres_core::RunId;
use cloudres_engine::{PollSink, ServiceSettings, StatusPoller};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollEvent {
    Update(String),
    Terminal,
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<PollEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl PollSink for RecordingSink {
    fn on_update(&self, _run_id: &RunId, status: &str) {
        self.events
            .lock()
            .unwrap()
            .push(PollEvent::Update(status.to_string()));
    }

    fn on_terminal(&self, _run_id: &RunId) {
        self.events.lock().unwrap().push(PollEvent::Terminal);
    }
}

fn poller_for(server: &MockServer) -> StatusPoller {
    StatusPoller::new(
        ServiceSettings::new(&server.uri())
            .unwrap()
            .with_poll_interval(INTERVAL),
    )
}

fn status(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/status")
        .count()
}

#[tokio::test]
async fn polls_until_completed_then_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(query_param("run_id", "r1"))
        .respond_with(status(r#"{"status":"running"}"#))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(query_param("run_id", "r1"))
        .respond_with(status(r#"{"status":"completed"}"#))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let handle = poller_for(&server).start(RunId::new("r1").unwrap(), sink.clone());

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(
        sink.events(),
        vec![
            PollEvent::Update("running".to_string()),
            PollEvent::Update("running".to_string()),
            PollEvent::Update("completed".to_string()),
            PollEvent::Terminal,
        ]
    );
    assert_eq!(status_requests(&server).await, 3);

    // Cancelling after natural termination is harmless, twice over.
    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
}

#[tokio::test]
async fn first_query_waits_one_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(status(r#"{"status":"running"}"#))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let _handle = poller_for(&server).start(RunId::new("r1").unwrap(), sink.clone());

    tokio::time::sleep(INTERVAL / 3).await;
    assert_eq!(status_requests(&server).await, 0);
    tokio::time::sleep(INTERVAL * 3).await;
    assert!(status_requests(&server).await >= 1);
}

#[tokio::test]
async fn cancel_before_first_tick_means_no_callbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(status(r#"{"status":"completed"}"#))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let handle = poller_for(&server).start(RunId::new("r1").unwrap(), sink.clone());
    handle.cancel();

    tokio::time::sleep(INTERVAL * 5).await;
    assert!(sink.events().is_empty());
    assert_eq!(status_requests(&server).await, 0);
}

#[tokio::test]
async fn dropping_the_handle_cancels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(status(r#"{"status":"running"}"#))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let handle = poller_for(&server).start(RunId::new("r1").unwrap(), sink.clone());
    tokio::time::sleep(INTERVAL * 3).await;
    drop(handle);

    let seen = sink.events().len();
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(sink.events().len(), seen);
}

#[tokio::test]
async fn failing_status_checks_are_skipped_silently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(status("not json"))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(status(r#"{"status":"completed"}"#))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let _handle = poller_for(&server).start(RunId::new("r1").unwrap(), sink.clone());

    tokio::time::sleep(INTERVAL * 12).await;
    assert_eq!(
        sink.events(),
        vec![
            PollEvent::Update("completed".to_string()),
            PollEvent::Terminal,
        ]
    );
    assert_eq!(status_requests(&server).await, 4);
}
