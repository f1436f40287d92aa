use grid_core::BatchId;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::api::{read_json, transport};
use crate::{ApiError, FilePayload, GridClient};

/// Lead records are open-ended rows of the uploaded CSV.
pub type Lead = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadQuery {
    pub page: u32,
    pub page_size: u32,
    pub batch_id: Option<BatchId>,
    pub search: Option<String>,
    pub region: Option<String>,
    pub lead_source: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: SortDir,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
            batch_id: None,
            search: None,
            region: None,
            lead_source: None,
            sort_by: None,
            sort_dir: SortDir::Asc,
        }
    }
}

impl LeadQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("page_size", self.page_size.max(1).to_string()),
        ];
        let optional = [
            ("batch_id", self.batch_id.as_ref().map(BatchId::to_string)),
            ("search", self.search.clone()),
            ("region", self.region.clone()),
            ("lead_source", self.lead_source.clone()),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v))),
        );
        if let Some(sort_by) = self.sort_by.as_ref().filter(|v| !v.is_empty()) {
            pairs.push(("sort_by", sort_by.clone()));
            pairs.push(("sort_dir", self.sort_dir.as_str().to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeadPage {
    pub leads: Vec<Lead>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LeadFilters {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CsvUploadReceipt {
    pub status: String,
    pub filename: String,
    pub rows: u64,
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentRoster {
    pub agents: Vec<AgentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stage: u32,
    pub status: String,
    #[serde(default)]
    pub last_run: Option<String>,
}

impl GridClient {
    pub async fn fetch_leads(&self, query: &LeadQuery) -> Result<LeadPage, ApiError> {
        let mut url = self.config().endpoint(&["leads"]);
        url.query_pairs_mut().extend_pairs(query.pairs());
        let response = self.http().get(url).send().await.map_err(transport)?;
        read_json(response, "Failed to fetch leads").await
    }

    /// Looks a lead up by its `lead_id` column or, failing that, its row index.
    pub async fn fetch_lead(&self, lead_id: &str) -> Result<Lead, ApiError> {
        let url = self.config().endpoint(&["leads", lead_id]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        read_json(response, "Failed to fetch lead").await
    }

    pub async fn fetch_lead_filters(&self) -> Result<LeadFilters, ApiError> {
        let url = self.config().endpoint(&["leads", "filters"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        read_json(response, "Failed to fetch filters").await
    }

    /// Replaces the server's leads table with a single CSV.
    pub async fn upload_leads_csv(&self, file: &FilePayload) -> Result<CsvUploadReceipt, ApiError> {
        let part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);
        let url = self.config().endpoint(&["leads", "upload"]);
        let response = self
            .http()
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_json(response, "Upload failed").await
    }

    pub async fn fetch_agent_status(&self) -> Result<AgentRoster, ApiError> {
        let url = self.config().endpoint(&["agents", "status"]);
        let response = self.http().get(url).send().await.map_err(transport)?;
        read_json(response, "Failed to fetch agent status").await
    }
}
