//! Grid client: HTTP access to the Strategic Grid backend, batch submission
//! and progress polling.
mod api;
mod config;
mod dashboard;
mod error;
mod leads;
mod poller;
mod submitter;
mod types;

pub use api::{BatchApi, GridClient};
pub use config::{
    parse_api_base, parse_poll_interval_ms, ClientConfig, API_URL_ENV, DEFAULT_API_BASE,
    DEFAULT_POLL_INTERVAL, POLL_INTERVAL_ENV,
};
pub use dashboard::{
    ActivityEntry, AgentOutput, AgentRun, AgentRunRequest, DashboardStats, DealStage,
    PriorityTarget,
};
pub use error::{ApiError, ConfigError, PollError, SubmitError, UPLOAD_REJECTED_FALLBACK};
pub use leads::{
    AgentInfo, AgentRoster, CsvUploadReceipt, Lead, LeadFilters, LeadPage, LeadQuery, SortDir,
};
pub use poller::{BatchMonitor, PollHandle, PollState, ProgressPoller};
pub use submitter::BatchSubmitter;
pub use types::{BatchReceipt, BatchSubmission, FilePayload, ReadyBatch};

pub use grid_core::{BatchId, BatchProgress, FileSlot, RunStatus, StageStatus};
