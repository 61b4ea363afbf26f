//! CloudRes engine: HTTP client for the analysis service and effect execution.
mod engine;
mod poll;
mod results;
mod settings;
mod text;
mod types;
mod upload;

pub use engine::EngineHandle;
pub use poll::{PollError, PollHandle, PollSink, StatusPoller};
pub use results::{ReqwestResultsFetcher, ResultsFetcher};
pub use settings::{ServiceSettings, SettingsError, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
pub use text::{decode_body, TextDecodeError};
pub use types::EngineEvent;
pub use upload::{ProgressSink, ReqwestUploader, Uploader, FILES_FIELD};
