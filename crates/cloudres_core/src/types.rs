use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Status value that marks a run as finished on the server.
pub const COMPLETED_STATUS: &str = "completed";

/// Server-issued identifier of one pipeline run.
///
/// The value is opaque: it is only ever checked for non-emptiness and passed
/// back to the service verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub byte_size: u64,
    pub path: PathBuf,
}

impl FileDescriptor {
    /// Builds a descriptor whose display name is the final path component.
    pub fn new(path: impl Into<PathBuf>, byte_size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            byte_size,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The files chosen for one upload, frozen at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSelection {
    files: Vec<FileDescriptor>,
}

impl FileSelection {
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.files.iter()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.byte_size).sum()
    }
}

impl FromIterator<FileDescriptor> for FileSelection {
    fn from_iter<I: IntoIterator<Item = FileDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub transferred: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Creates a progress value, clamping `transferred` to `total`.
    pub fn new(transferred: u64, total: u64) -> Self {
        Self {
            transferred: transferred.min(total),
            total,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.transferred == self.total
    }

    /// Whole percent transferred. Nothing to send counts as done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.transferred as u128 * 100) / self.total as u128).min(100) as u8
    }
}

/// Which files the service accepts. Mirrors the upload form constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Case-insensitive file name suffixes; empty accepts everything.
    pub accepted_suffixes: Vec<String>,
    pub max_file_bytes: u64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            accepted_suffixes: vec![".fastq.gz".to_string()],
            max_file_bytes: 1_000_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge { byte_size: u64, max_bytes: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedType => write!(f, "unsupported file type"),
            RejectReason::TooLarge {
                byte_size,
                max_bytes,
            } => write!(f, "file too large ({byte_size} bytes, max {max_bytes})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: RejectReason,
}

impl SelectionPolicy {
    /// Splits candidate files into an accepted selection and the rejects, keeping order.
    pub fn screen(&self, candidates: Vec<FileDescriptor>) -> (FileSelection, Vec<RejectedFile>) {
        let mut accepted = Vec::with_capacity(candidates.len());
        let mut rejected = Vec::new();
        for file in candidates {
            match self.check(&file) {
                Ok(()) => accepted.push(file),
                Err(reason) => rejected.push(RejectedFile {
                    name: file.name,
                    reason,
                }),
            }
        }
        (FileSelection::new(accepted), rejected)
    }

    fn check(&self, file: &FileDescriptor) -> Result<(), RejectReason> {
        let name = file.name.to_ascii_lowercase();
        let type_ok = self.accepted_suffixes.is_empty()
            || self
                .accepted_suffixes
                .iter()
                .any(|suffix| name.ends_with(&suffix.to_ascii_lowercase()));
        if !type_ok {
            return Err(RejectReason::UnsupportedType);
        }
        if file.byte_size > self.max_file_bytes {
            return Err(RejectReason::TooLarge {
                byte_size: file.byte_size,
                max_bytes: self.max_file_bytes,
            });
        }
        Ok(())
    }
}

/// Static reports the service publishes per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    MultiQc,
    Nextflow,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::MultiQc, ReportKind::Nextflow];

    /// Endpoint path relative to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            ReportKind::MultiQc => "multiqc_report",
            ReportKind::Nextflow => "nextflow_report",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::MultiQc => "MultiQC report",
            ReportKind::Nextflow => "Nextflow report",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_rejects_blank() {
        assert!(RunId::new("").is_none());
        assert!(RunId::new("  \t").is_none());
        assert_eq!(RunId::new("r1").unwrap().as_str(), "r1");
    }

    #[test]
    fn descriptor_name_is_file_name() {
        let file = FileDescriptor::new("/data/in/sample_R1.fastq.gz", 12);
        assert_eq!(file.name, "sample_R1.fastq.gz");
    }

    #[test]
    fn empty_upload_reads_as_complete() {
        assert!(UploadProgress::new(0, 0).is_complete());
        assert_eq!(UploadProgress::new(0, 0).percent(), 100);
        assert_eq!(UploadProgress::new(0, 10).percent(), 0);
        assert_eq!(UploadProgress::new(5, 10).percent(), 50);
        assert_eq!(UploadProgress::new(50, 10), UploadProgress::new(10, 10));
    }

    #[test]
    fn policy_rejects_wrong_suffix_and_oversize() {
        let policy = SelectionPolicy {
            max_file_bytes: 100,
            ..SelectionPolicy::default()
        };
        let (accepted, rejected) = policy.screen(vec![
            FileDescriptor::new("a.FASTQ.GZ", 10),
            FileDescriptor::new("notes.txt", 10),
            FileDescriptor::new("big.fastq.gz", 101),
        ]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected[0].reason, RejectReason::UnsupportedType);
        assert_eq!(
            rejected[1].reason,
            RejectReason::TooLarge {
                byte_size: 101,
                max_bytes: 100
            }
        );
    }
}
