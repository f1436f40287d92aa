use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::BatchId;

/// Overall batch state as reported by the server.
///
/// The vocabulary belongs to the backend, so unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Error,
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Processing => "processing",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Error => "error",
            RunStatus::Other(label) => label,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Error
        )
    }
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "queued" => RunStatus::Queued,
            "processing" => RunStatus::Processing,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "error" => RunStatus::Error,
            _ => RunStatus::Other(value),
        }
    }
}

impl From<RunStatus> for String {
    fn from(value: RunStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StageStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
    Other(String),
}

impl StageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
            StageStatus::Other(label) => label,
        }
    }
}

impl From<String> for StageStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => StageStatus::Pending,
            "running" => StageStatus::Running,
            "completed" => StageStatus::Completed,
            "error" => StageStatus::Error,
            _ => StageStatus::Other(value),
        }
    }
}

impl From<StageStatus> for String {
    fn from(value: StageStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stages the backend pipeline reports, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Research,
    Intent,
    Message,
    Timing,
    Logger,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Research,
        PipelineStage::Intent,
        PipelineStage::Message,
        PipelineStage::Timing,
        PipelineStage::Logger,
    ];

    /// Key used in the `agents` map of a progress response.
    pub fn key(self) -> &'static str {
        match self {
            PipelineStage::Research => "research",
            PipelineStage::Intent => "intent",
            PipelineStage::Message => "message",
            PipelineStage::Timing => "timing",
            PipelineStage::Logger => "logger",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PipelineStage::Research => "Research Agent",
            PipelineStage::Intent => "Intent Scoring",
            PipelineStage::Message => "Message Draft",
            PipelineStage::Timing => "Timing Engine",
            PipelineStage::Logger => "Data Logger",
        }
    }
}

/// Point-in-time read of a batch's execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    pub status: RunStatus,
    #[serde(deserialize_with = "deserialize_percent")]
    pub percent: u8,
    #[serde(default)]
    pub agents: BTreeMap<String, StageStatus>,
}

impl BatchProgress {
    pub fn stage_status(&self, stage: PipelineStage) -> StageStatus {
        self.agents.get(stage.key()).cloned().unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Accepts any JSON number and clamps it into 0..=100.
fn deserialize_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.clamp(0.0, 100.0).round() as u8)
}
