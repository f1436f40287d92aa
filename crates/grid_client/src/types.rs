use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use bytes::Bytes;
use grid_core::{BatchId, FileSlot};
use serde::Deserialize;

use crate::SubmitError;

/// One file blob plus the name it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a whole file; the upload name is the path's final component.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Inputs for one batch upload, possibly incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSubmission {
    files: BTreeMap<FileSlot, FilePayload>,
    start_index: Option<String>,
    end_index: Option<String>,
}

impl BatchSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, slot: FileSlot, payload: FilePayload) -> Self {
        self.set_file(slot, payload);
        self
    }

    pub fn set_file(&mut self, slot: FileSlot, payload: FilePayload) {
        self.files.insert(slot, payload);
    }

    pub fn remove_file(&mut self, slot: FileSlot) -> Option<FilePayload> {
        self.files.remove(&slot)
    }

    pub fn with_start_index(mut self, raw: impl Into<String>) -> Self {
        self.start_index = Some(raw.into());
        self
    }

    pub fn with_end_index(mut self, raw: impl Into<String>) -> Self {
        self.end_index = Some(raw.into());
        self
    }

    pub fn set_bounds(&mut self, start_index: Option<String>, end_index: Option<String>) {
        self.start_index = start_index;
        self.end_index = end_index;
    }

    pub fn missing_slots(&self) -> Vec<FileSlot> {
        FileSlot::ALL
            .into_iter()
            .filter(|slot| !self.files.contains_key(slot))
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.files.len() == FileSlot::ALL.len()
    }

    /// Checks completeness and freezes the inputs into a sendable batch.
    ///
    /// Bounds are trimmed and blank ones dropped; their numeric form and
    /// ordering are left to the server.
    pub fn validate(&self) -> Result<ReadyBatch, SubmitError> {
        let missing = self.missing_slots();
        if !missing.is_empty() {
            return Err(SubmitError::MissingFiles { missing });
        }

        let files = FileSlot::ALL
            .into_iter()
            .filter_map(|slot| self.files.get(&slot).map(|p| (slot, p.clone())))
            .collect();

        Ok(ReadyBatch {
            files,
            start_index: non_blank(self.start_index.as_deref()),
            end_index: non_blank(self.end_index.as_deref()),
        })
    }
}

/// A submission with all five payloads present, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyBatch {
    files: Vec<(FileSlot, FilePayload)>,
    start_index: Option<String>,
    end_index: Option<String>,
}

impl ReadyBatch {
    pub fn files(&self) -> impl Iterator<Item = (FileSlot, &FilePayload)> {
        self.files.iter().map(|(slot, payload)| (*slot, payload))
    }

    pub fn start_index(&self) -> Option<&str> {
        self.start_index.as_deref()
    }

    pub fn end_index(&self) -> Option<&str> {
        self.end_index.as_deref()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|(_, payload)| payload.len()).sum()
    }
}

/// Body of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchReceipt {
    pub batch_id: BatchId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub files_received: Option<u32>,
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
