use std::path::PathBuf;

use crate::{BatchId, FileSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the selected files and send them with the given (already trimmed)
    /// row bounds. `files` lists every slot in form order.
    SubmitBatch {
        files: Vec<(FileSlot, PathBuf)>,
        start_index: Option<String>,
        end_index: Option<String>,
    },
    StartMonitoring { batch_id: BatchId },
    StopMonitoring,
}
