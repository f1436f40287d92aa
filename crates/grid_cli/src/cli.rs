use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use grid_client::{API_URL_ENV, POLL_INTERVAL_ENV};

#[derive(Debug, Parser)]
#[command(name = "grid", version, about = "Strategic Grid batch uploader and progress monitor")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// RON settings file, overridden by environment and flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// API base URL, e.g. http://127.0.0.1:8000/api
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,
    /// Progress poll interval in milliseconds
    #[arg(long, global = true, env = POLL_INTERVAL_ENV)]
    pub poll_interval_ms: Option<u64>,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload the five batch files and follow processing
    Upload(UploadArgs),
    /// Follow progress of an existing batch
    Watch {
        batch_id: String,
    },
    /// List leads
    Leads(LeadsArgs),
    /// Show one lead by id or row index
    Lead {
        id: String,
    },
    /// List region and source filter values
    Filters,
    /// Show pipeline agent status
    Agents,
    /// Replace the leads table with a CSV file
    UploadLeads {
        csv: PathBuf,
    },
    /// Run one pipeline agent on demand
    RunAgent {
        agent_id: String,
        /// Lead to run the agent against
        #[arg(long)]
        lead: Option<String>,
    },
    /// Show dashboard figures, priority targets, pipeline and recent activity
    Dashboard,
    /// List stored agent outputs
    Outputs,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Agent mappings file
    #[arg(long)]
    pub agent_mapping: Option<PathBuf>,
    /// CRM pipeline export
    #[arg(long)]
    pub crm_pipeline: Option<PathBuf>,
    /// Email logs export
    #[arg(long)]
    pub email_logs: Option<PathBuf>,
    /// Leads data file
    #[arg(long)]
    pub leads_data: Option<PathBuf>,
    /// Sales pipeline export
    #[arg(long)]
    pub sales_pipeline: Option<PathBuf>,
    /// First lead row to process
    #[arg(long)]
    pub start: Option<String>,
    /// Last lead row to process
    #[arg(long)]
    pub end: Option<String>,
    /// Print the batch id and exit without polling
    #[arg(long)]
    pub no_watch: bool,
}

#[derive(Debug, Args)]
pub struct LeadsArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 25)]
    pub page_size: u32,
    /// Only leads from this batch
    #[arg(long)]
    pub batch: Option<String>,
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    /// Lead source filter
    #[arg(long)]
    pub source: Option<String>,
    /// Column to sort by
    #[arg(long)]
    pub sort_by: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}
