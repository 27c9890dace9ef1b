//! Append-only diagnostic log for unrecovered faults.
//!
//! Every entry is also emitted through `tracing`, so a failing sink never hides a fault.
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::Fault;

#[derive(Debug, Error)]
pub enum FaultLogError {
    #[error("fault log io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fault log encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the request was when the fault surfaced.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FaultContext {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FaultEntry {
    pub timestamp: DateTime<Utc>,
    pub error_id: Uuid,
    pub kind: String,
    pub message: String,
    #[serde(flatten)]
    pub context: FaultContext,
}

#[async_trait]
pub trait FaultSink: Send + Sync {
    // Backend name (for diagnostics).
    fn name(&self) -> &'static str;

    async fn append(&self, entry: &FaultEntry) -> Result<(), FaultLogError>;
}

/// JSON lines in `<dir>/exceptions_YYYYMMDD.log`, one file per UTC day.
#[derive(Debug, Clone)]
pub struct FileFaultSink {
    dir: PathBuf,
}

impl FileFaultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_for(&self, timestamp: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("exceptions_{}.log", timestamp.format("%Y%m%d")))
    }
}

#[async_trait]
impl FaultSink for FileFaultSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn append(&self, entry: &FaultEntry) -> Result<(), FaultLogError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(entry.timestamp))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Keeps entries in memory. Cheap to clone; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryFaultSink {
    entries: Arc<Mutex<Vec<FaultEntry>>>,
}

impl MemoryFaultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<FaultEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FaultSink for MemoryFaultSink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, entry: &FaultEntry) -> Result<(), FaultLogError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct FaultLog {
    sink: Arc<dyn FaultSink>,
}

impl std::fmt::Debug for FaultLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultLog")
            .field("sink", &self.sink.name())
            .finish()
    }
}

impl FaultLog {
    pub fn new(sink: Arc<dyn FaultSink>) -> Self {
        Self { sink }
    }

    /// Record one fault and return the entry that was written.
    pub async fn record(&self, fault: &Fault, context: FaultContext) -> FaultEntry {
        let entry = FaultEntry {
            timestamp: Utc::now(),
            error_id: Uuid::new_v4(),
            kind: fault.kind().to_string(),
            message: fault.message().to_string(),
            context,
        };

        tracing::error!(
            error_id = %entry.error_id,
            kind = %entry.kind,
            message = %entry.message,
            method = %entry.context.method,
            path = %entry.context.path,
            request_id = ?entry.context.request_id,
            "unhandled fault"
        );

        if let Err(e) = self.sink.append(&entry).await {
            tracing::error!(
                error_id = %entry.error_id,
                sink = self.sink.name(),
                error = %e,
                "failed to append to fault log"
            );
        }

        entry
    }
}
