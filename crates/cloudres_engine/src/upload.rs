use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use bytes::Bytes;
use cloudres_core::{FileSelection, RunId, UploadError, UploadProgress};
use cloudres_logging::{cloudres_debug, cloudres_info, cloudres_warn};
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use crate::settings::{ServiceSettings, UPLOAD_PATH};

/// Multipart field every file is sent under.
pub const FILES_FIELD: &str = "files";

pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: UploadProgress);
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        files: &FileSelection,
        sink: &dyn ProgressSink,
    ) -> Result<RunId, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    run_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    settings: ServiceSettings,
}

impl ReqwestUploader {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }

    /// Builds the multipart form. Each part streams its file and reports the
    /// running byte count on `sent_tx` as the transport pulls chunks.
    async fn build_form(
        files: &FileSelection,
        sent_tx: mpsc::UnboundedSender<u64>,
    ) -> Result<(Form, u64), UploadError> {
        let sent = Arc::new(AtomicU64::new(0));
        let mut form = Form::new();
        let mut total = 0u64;

        for file in files.iter() {
            let unreadable = |err: std::io::Error| UploadError::FileUnreadable {
                name: file.name.clone(),
                message: err.to_string(),
            };
            let handle = tokio::fs::File::open(file.path()).await.map_err(unreadable)?;
            let length = handle.metadata().await.map_err(unreadable)?.len();
            total += length;

            let sent = sent.clone();
            let sent_tx = sent_tx.clone();
            let stream = ReaderStream::new(handle).inspect_ok(move |chunk: &Bytes| {
                let len = chunk.len() as u64;
                let now = sent.fetch_add(len, Ordering::Relaxed) + len;
                let _ = sent_tx.send(now);
            });
            let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), length)
                .file_name(file.name.clone());
            form = form.part(FILES_FIELD, part);
        }

        Ok((form, total))
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(
        &self,
        files: &FileSelection,
        sink: &dyn ProgressSink,
    ) -> Result<RunId, UploadError> {
        if files.is_empty() {
            return Err(UploadError::EmptySelection);
        }
        let url = self
            .settings
            .endpoint(UPLOAD_PATH, None)
            .map_err(|err| UploadError::Network(err.to_string()))?;
        let client = self
            .settings
            .build_client()
            .map_err(|err| UploadError::Network(err.to_string()))?;

        let (sent_tx, mut sent_rx) = mpsc::unbounded_channel();
        let (form, total) = Self::build_form(files, sent_tx).await?;
        cloudres_info!(
            "Uploading {} file(s), {} bytes, to {}",
            files.len(),
            total,
            url
        );

        let mut reported = 0u64;
        sink.emit(UploadProgress::new(0, total));

        let request = client.post(url).multipart(form).send();
        tokio::pin!(request);
        let response = loop {
            tokio::select! {
                biased;
                Some(sent) = sent_rx.recv() => {
                    if sent > reported {
                        reported = sent.min(total);
                        sink.emit(UploadProgress::new(reported, total));
                    }
                }
                result = &mut request => break result,
            }
        };
        while let Ok(sent) = sent_rx.try_recv() {
            if sent > reported {
                reported = sent.min(total);
                sink.emit(UploadProgress::new(reported, total));
            }
        }

        let response = response.map_err(|err| {
            cloudres_warn!("Upload request failed: {}", err);
            UploadError::Network(err.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            cloudres_warn!("Upload rejected with status {}", status);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| UploadError::Network(err.to_string()))?;
        let parsed: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| UploadError::MalformedResponse(err.to_string()))?;
        if let Some(message) = parsed.error.filter(|message| !message.trim().is_empty()) {
            cloudres_warn!("Upload refused by service: {}", message);
            return Err(UploadError::ServiceError(message));
        }
        let run_id = parsed
            .run_id
            .and_then(RunId::new)
            .ok_or_else(|| UploadError::MalformedResponse("response has no run_id".to_string()))?;

        if reported < total {
            sink.emit(UploadProgress::new(total, total));
        }
        cloudres_debug!("Upload accepted as run {}", run_id);
        Ok(run_id)
    }
}
