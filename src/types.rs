use std::path::Path;
use std::time::Duration;

/// Which transfer primitive a task is executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Download,
    UploadBucket,
    UploadWebdav,
}

/// One unit of work: a single object or file to move.
///
/// `source` is an object key (downloads) or a local path (uploads);
/// `destination` is a local path (downloads) or an object key / remote
/// name (uploads). Immutable once built by the enumerator.
#[derive(Debug, Clone)]
pub struct TransferTask {
    pub source: String,
    pub destination: String,
    pub kind: TransferKind,
}

/// How upload destinations are named from the enumerated matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Keep the original file name (without its directory).
    Original,
    /// Rename to the zero-based enumeration index, keeping the suffix:
    /// 0.grib2, 1.grib2, ...
    Incremental,
}

impl NamingPolicy {
    /// Destination name for the match at `index`. Deterministic given the
    /// enumeration order; incremental names are unique within one run.
    pub fn destination(&self, index: usize, path: &Path) -> String {
        match self {
            NamingPolicy::Original => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            NamingPolicy::Incremental => match path.extension() {
                Some(ext) => format!("{}.{}", index, ext.to_string_lossy()),
                None => index.to_string(),
            },
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum TransferStatus {
    Success,
    Failed,
}

#[derive(Debug)]
pub struct TransferReport {
    pub task: TransferTask,
    pub status: TransferStatus,
    pub duration: Duration,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct TransferSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration: Duration,
    pub reports: Vec<TransferReport>,
}
