use std::path::PathBuf;

use crate::{BatchId, BatchProgress, FileSlot, PipelineStage, RunStatus, StageStatus, UploadStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub slots: Vec<SlotView>,
    pub missing: Vec<FileSlot>,
    pub ready: bool,
    pub start_index: String,
    pub end_index: String,
    pub upload: UploadStatus,
    pub monitored: Option<BatchId>,
    pub progress: Option<ProgressView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub slot: FileSlot,
    pub label: &'static str,
    /// Final path component of the selected file.
    pub file_name: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub status: RunStatus,
    pub percent: u8,
    pub stages: Vec<StageRow>,
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRow {
    pub key: String,
    pub name: String,
    pub status: StageStatus,
}

impl ProgressView {
    /// Known stages first in pipeline order (pending when absent), then any
    /// extra keys the server reported, alphabetically.
    pub fn from_progress(progress: &BatchProgress) -> Self {
        let mut stages: Vec<StageRow> = PipelineStage::ALL
            .into_iter()
            .map(|stage| StageRow {
                key: stage.key().to_string(),
                name: stage.display_name().to_string(),
                status: progress.stage_status(stage),
            })
            .collect();

        let extra = progress
            .agents
            .iter()
            .filter(|(key, _)| !PipelineStage::ALL.iter().any(|s| s.key() == key.as_str()))
            .map(|(key, status)| StageRow {
                key: key.clone(),
                name: key.clone(),
                status: status.clone(),
            });
        stages.extend(extra);

        Self {
            status: progress.status.clone(),
            percent: progress.percent,
            stages,
            terminal: progress.is_terminal(),
        }
    }
}
