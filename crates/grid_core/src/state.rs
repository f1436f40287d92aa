use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::view_model::{AppViewModel, ProgressView, SlotView};
use crate::{BatchId, BatchProgress, FileSlot};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded {
        batch_id: BatchId,
    },
    Failed {
        message: String,
    },
}

impl UploadStatus {
    /// While a submission is in flight or accepted, the form is frozen.
    pub fn is_locked(&self) -> bool {
        matches!(self, UploadStatus::Uploading | UploadStatus::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    files: BTreeMap<FileSlot, PathBuf>,
    start_index: String,
    end_index: String,
    upload: UploadStatus,
    monitored: Option<BatchId>,
    progress: Option<BatchProgress>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_status(&self) -> &UploadStatus {
        &self.upload
    }

    pub fn monitored_batch(&self) -> Option<&BatchId> {
        self.monitored.as_ref()
    }

    pub fn progress(&self) -> Option<&BatchProgress> {
        self.progress.as_ref()
    }

    /// All five slots populated. The row bounds never gate readiness.
    pub fn is_ready(&self) -> bool {
        FileSlot::ALL.iter().all(|slot| self.files.contains_key(slot))
    }

    pub fn missing_slots(&self) -> Vec<FileSlot> {
        FileSlot::ALL
            .into_iter()
            .filter(|slot| !self.files.contains_key(slot))
            .collect()
    }

    pub fn view(&self) -> AppViewModel {
        let slots = FileSlot::ALL
            .into_iter()
            .map(|slot| SlotView {
                slot,
                label: slot.label(),
                file_name: self.files.get(&slot).map(|path| display_name(path)),
                path: self.files.get(&slot).cloned(),
            })
            .collect();

        AppViewModel {
            slots,
            missing: self.missing_slots(),
            ready: self.is_ready(),
            start_index: self.start_index.clone(),
            end_index: self.end_index.clone(),
            upload: self.upload.clone(),
            monitored: self.monitored.clone(),
            progress: self.progress.as_ref().map(ProgressView::from_progress),
            dirty: self.dirty,
        }
    }

    /// Returns whether a redraw is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_file(&mut self, slot: FileSlot, path: PathBuf) {
        if self.files.get(&slot) != Some(&path) {
            self.files.insert(slot, path);
            self.mark_dirty();
        }
    }

    /// Selected files in form order.
    pub(crate) fn selected_files(&self) -> Vec<(FileSlot, PathBuf)> {
        FileSlot::ALL
            .into_iter()
            .filter_map(|slot| self.files.get(&slot).map(|path| (slot, path.clone())))
            .collect()
    }

    pub(crate) fn clear_file(&mut self, slot: FileSlot) {
        if self.files.remove(&slot).is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_start_index(&mut self, value: String) {
        if self.start_index != value {
            self.start_index = value;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_end_index(&mut self, value: String) {
        if self.end_index != value {
            self.end_index = value;
            self.mark_dirty();
        }
    }

    /// Trimmed row bounds; blank inputs become `None`.
    pub(crate) fn bounds(&self) -> (Option<String>, Option<String>) {
        (non_blank(&self.start_index), non_blank(&self.end_index))
    }

    pub(crate) fn set_upload(&mut self, upload: UploadStatus) {
        self.upload = upload;
        self.mark_dirty();
    }

    pub(crate) fn start_monitoring(&mut self, batch_id: BatchId) {
        self.monitored = Some(batch_id);
        self.progress = None;
        self.mark_dirty();
    }

    pub(crate) fn stop_monitoring(&mut self) {
        self.monitored = None;
        self.progress = None;
        self.mark_dirty();
    }

    pub(crate) fn replace_progress(&mut self, progress: BatchProgress) {
        if self.progress.as_ref() != Some(&progress) {
            self.progress = Some(progress);
            self.mark_dirty();
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
