//! Dashboard aggregates and on-demand agent runs.

use serde::{Deserialize, Serialize};

use crate::api::{read_json, transport};
use crate::{ApiError, GridClient};

/// KPI figures for the dashboard header.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_leads: u64,
    /// Percent of leads converted.
    pub conversion_rate: f64,
    pub pipeline_value: i64,
    pub active_agents: u32,
    pub emails_sent: u64,
    /// Percent of emails opened.
    pub response_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriorityTarget {
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub signal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub agent: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub action: String,
    pub timestamp: String,
}

/// Deal count and summed close value for one sales stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DealStage {
    pub deal_stage: String,
    pub count: u64,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentOutput {
    pub filename: String,
    pub agent: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub preview: String,
}

/// Body of `POST /agents/run/{id}`. Unset fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AgentRunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}

impl AgentRunRequest {
    pub fn for_lead(lead_id: impl Into<String>) -> Self {
        Self {
            lead_id: Some(lead_id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentRun {
    pub agent_id: String,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Agent output as produced; `None` when the agent had nothing to report.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TargetsBody {
    #[serde(default)]
    targets: Vec<PriorityTarget>,
}

#[derive(Deserialize)]
struct ActivityBody {
    #[serde(default)]
    activities: Vec<ActivityEntry>,
}

#[derive(Deserialize)]
struct PipelineBody {
    #[serde(default)]
    stages: Vec<DealStage>,
}

#[derive(Deserialize)]
struct OutputsBody {
    #[serde(default)]
    outputs: Vec<AgentOutput>,
}

impl GridClient {
    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let url = self.config().endpoint(&["dashboard", "stats"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        read_json(response, "Failed to fetch dashboard stats").await
    }

    pub async fn fetch_priority_targets(&self) -> Result<Vec<PriorityTarget>, ApiError> {
        let url = self.config().endpoint(&["dashboard", "priority-targets"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        let body: TargetsBody = read_json(response, "Failed to fetch priority targets").await?;
        Ok(body.targets)
    }

    /// Recent agent activity, newest first as ordered by the server.
    pub async fn fetch_activity(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        let url = self.config().endpoint(&["dashboard", "activity"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        let body: ActivityBody = read_json(response, "Failed to fetch activity").await?;
        Ok(body.activities)
    }

    pub async fn fetch_pipeline(&self) -> Result<Vec<DealStage>, ApiError> {
        let url = self.config().endpoint(&["dashboard", "pipeline"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        let body: PipelineBody = read_json(response, "Failed to fetch pipeline").await?;
        Ok(body.stages)
    }

    pub async fn fetch_agent_outputs(&self) -> Result<Vec<AgentOutput>, ApiError> {
        let url = self.config().endpoint(&["agents", "outputs"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        let body: OutputsBody = read_json(response, "Failed to fetch agent outputs").await?;
        Ok(body.outputs)
    }

    /// Runs one pipeline agent on demand. An unknown agent is a 404 carrying
    /// the server's detail.
    pub async fn run_agent(
        &self,
        agent_id: &str,
        request: &AgentRunRequest,
    ) -> Result<AgentRun, ApiError> {
        let url = self.config().endpoint(&["agents", "run", agent_id]);
        let response = self
            .http()
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json(response, "Agent run failed").await
    }
}
