use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque server-issued identifier for one submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty or whitespace-only id means "nothing to monitor".
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BatchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The five required payloads of a batch submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileSlot {
    AgentMapping,
    CrmPipeline,
    EmailLogs,
    LeadsData,
    SalesPipeline,
}

impl FileSlot {
    pub const ALL: [FileSlot; 5] = [
        FileSlot::AgentMapping,
        FileSlot::CrmPipeline,
        FileSlot::EmailLogs,
        FileSlot::LeadsData,
        FileSlot::SalesPipeline,
    ];

    /// Multipart field name expected by the upload endpoint.
    pub fn field_name(self) -> &'static str {
        match self {
            FileSlot::AgentMapping => "agent_mapping",
            FileSlot::CrmPipeline => "crm_pipeline",
            FileSlot::EmailLogs => "email_logs",
            FileSlot::LeadsData => "leads_data",
            FileSlot::SalesPipeline => "sales_pipeline",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileSlot::AgentMapping => "Agent Mappings",
            FileSlot::CrmPipeline => "CRM Pipeline",
            FileSlot::EmailLogs => "Email Logs",
            FileSlot::LeadsData => "Leads Data",
            FileSlot::SalesPipeline => "Sales Pipeline",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
