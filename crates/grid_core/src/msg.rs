use std::path::PathBuf;

use crate::{BatchId, BatchProgress, FileSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file for one of the required slots.
    FileSelected { slot: FileSlot, path: PathBuf },
    /// User removed the file from a slot.
    FileCleared(FileSlot),
    /// User edited the optional start row bound.
    StartIndexChanged(String),
    /// User edited the optional end row bound.
    EndIndexChanged(String),
    /// User asked to submit the batch.
    UploadClicked,
    /// Server accepted the submission.
    UploadSucceeded { batch_id: BatchId },
    /// Submission was rejected or never reached the server.
    UploadFailed { message: String },
    /// Poller delivered a snapshot for a batch.
    ProgressReceived {
        batch_id: BatchId,
        progress: BatchProgress,
    },
    /// Consumer stopped watching the monitored batch.
    MonitorClosed,
}
