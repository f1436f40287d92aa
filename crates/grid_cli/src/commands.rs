use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use grid_client::{
    AgentRunRequest, BatchMonitor, FilePayload, GridClient, LeadQuery, ProgressPoller, SortDir,
};
use grid_core::{BatchId, FileSlot, Msg, ProgressView, RunStatus, UploadStatus};
use grid_logging::grid_info;

use crate::cli::{Command, LeadsArgs, UploadArgs};
use crate::effects::EffectRunner;
use crate::render;
use crate::session::UploadSession;
use crate::settings::Settings;

pub async fn run(command: Command, settings: Settings) -> Result<()> {
    let client = GridClient::new(settings.client.clone()).context("building http client")?;
    grid_info!("Using API base {}", client.config().api_base());

    match command {
        Command::Upload(args) => upload(client, args).await,
        Command::Watch { batch_id } => watch(client, BatchId::new(batch_id)).await,
        Command::Leads(args) => leads(&client, args).await,
        Command::Lead { id } => {
            let lead = client.fetch_lead(&id).await?;
            println!("{}", serde_json::to_string_pretty(&lead)?);
            Ok(())
        }
        Command::Filters => {
            let filters = client.fetch_lead_filters().await?;
            println!("Regions: {}", filters.regions.join(", "));
            println!("Sources: {}", filters.sources.join(", "));
            Ok(())
        }
        Command::Agents => {
            let roster = client.fetch_agent_status().await?;
            for agent in roster.agents {
                println!(
                    "{}. {:<16} {:<10} last run: {}",
                    agent.stage,
                    agent.name,
                    agent.status,
                    agent.last_run.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Command::UploadLeads { csv } => {
            let file = read_payload(&csv)?;
            let receipt = client.upload_leads_csv(&file).await?;
            println!(
                "Uploaded {}: {} rows, {} columns",
                receipt.filename,
                receipt.rows,
                receipt.columns.len()
            );
            Ok(())
        }
        Command::RunAgent { agent_id, lead } => {
            let request = lead.map(AgentRunRequest::for_lead).unwrap_or_default();
            let run = client.run_agent(&agent_id, &request).await?;
            println!(
                "{} {} at {}",
                run.agent_id,
                run.status,
                run.timestamp.as_deref().unwrap_or("-")
            );
            if let Some(result) = run.result {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(())
        }
        Command::Dashboard => dashboard(&client).await,
        Command::Outputs => {
            for output in client.fetch_agent_outputs().await? {
                println!("{:<32} {:>8} B  {}", output.filename, output.size_bytes, output.agent);
            }
            Ok(())
        }
    }
}

async fn dashboard(client: &GridClient) -> Result<()> {
    let stats = client.fetch_dashboard_stats().await?;
    println!(
        "Leads {}  converted {:.1}%  pipeline {}  emails {} ({:.1}% opened)  agents {}",
        stats.total_leads,
        stats.conversion_rate,
        stats.pipeline_value,
        stats.emails_sent,
        stats.response_rate,
        stats.active_agents
    );

    println!("Priority targets:");
    for target in client.fetch_priority_targets().await? {
        println!(
            "  {} ({}, {})  {}",
            target.name, target.title, target.company, target.signal
        );
    }

    println!("Pipeline:");
    for stage in client.fetch_pipeline().await? {
        println!("  {:<12} {:>5} deals  {:>12.0}", stage.deal_stage, stage.count, stage.value);
    }

    println!("Recent activity:");
    for entry in client.fetch_activity().await?.into_iter().take(10) {
        println!("  {}  {:<18} {}", entry.timestamp, entry.agent, entry.action);
    }
    Ok(())
}

async fn upload(client: GridClient, args: UploadArgs) -> Result<()> {
    let poll_interval = client.config().poll_interval;
    let runner =
        EffectRunner::new(Arc::new(client), poll_interval).with_follow_progress(!args.no_watch);
    let mut session = UploadSession::new(runner);

    for (slot, path) in chosen_files(&args) {
        session.dispatch(Msg::FileSelected { slot, path }).await;
    }
    if let Some(start) = args.start {
        session.dispatch(Msg::StartIndexChanged(start)).await;
    }
    if let Some(end) = args.end {
        session.dispatch(Msg::EndIndexChanged(end)).await;
    }

    if !session.state().is_ready() {
        print_view(&mut session);
        bail!("upload needs all five files");
    }

    session.dispatch(Msg::UploadClicked).await;
    print_view(&mut session);

    let batch_id = match session.state().upload_status() {
        UploadStatus::Succeeded { batch_id } => batch_id.clone(),
        UploadStatus::Failed { message } => bail!("{message}"),
        other => bail!("upload ended in unexpected state {other:?}"),
    };
    if args.no_watch {
        println!("{batch_id}");
        return Ok(());
    }

    let outcome = session
        .follow_progress(ctrl_c(), |view| {
            if let Some(progress) = &view.progress {
                print_lines(render::progress_lines(view.monitored.as_ref(), progress));
            }
        })
        .await;
    report_outcome(&batch_id, outcome)
}

async fn watch(client: GridClient, batch_id: BatchId) -> Result<()> {
    if batch_id.is_blank() {
        bail!("batch id must not be empty");
    }
    let interval = client.config().poll_interval;
    let mut monitor = BatchMonitor::new(ProgressPoller::new(Arc::new(client), interval));
    monitor.watch(Some(batch_id.clone()));

    let Some(mut updates) = monitor.subscribe() else {
        bail!("monitor did not start");
    };
    let shutdown = ctrl_c();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break None,
            changed = updates.changed() => {
                if changed.is_err() {
                    break None;
                }
                let Some(progress) = updates.borrow_and_update().clone() else {
                    continue;
                };
                print_lines(render::progress_lines(
                    Some(&batch_id),
                    &ProgressView::from_progress(&progress),
                ));
                if progress.is_terminal() {
                    break Some(progress.status);
                }
            }
        }
    };

    monitor.stop();
    report_outcome(&batch_id, outcome)
}

async fn leads(client: &GridClient, args: LeadsArgs) -> Result<()> {
    let query = LeadQuery {
        page: args.page,
        page_size: args.page_size,
        batch_id: args.batch.map(BatchId::new),
        search: args.search,
        region: args.region,
        lead_source: args.source,
        sort_by: args.sort_by,
        sort_dir: if args.desc { SortDir::Desc } else { SortDir::Asc },
    };
    let page = client.fetch_leads(&query).await?;
    println!(
        "Page {}/{} ({} leads)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
    for lead in page.leads {
        println!("{}", serde_json::Value::Object(lead));
    }
    Ok(())
}

fn report_outcome(batch_id: &BatchId, outcome: Option<RunStatus>) -> Result<()> {
    match outcome {
        Some(RunStatus::Completed) => {
            println!("Batch {batch_id} completed");
            Ok(())
        }
        Some(status) => bail!("batch {batch_id} finished with status {status}"),
        None => {
            println!("Stopped following batch {batch_id}");
            Ok(())
        }
    }
}

fn chosen_files(args: &UploadArgs) -> Vec<(FileSlot, PathBuf)> {
    let candidates = [
        (FileSlot::AgentMapping, &args.agent_mapping),
        (FileSlot::CrmPipeline, &args.crm_pipeline),
        (FileSlot::EmailLogs, &args.email_logs),
        (FileSlot::LeadsData, &args.leads_data),
        (FileSlot::SalesPipeline, &args.sales_pipeline),
    ];
    candidates
        .into_iter()
        .filter_map(|(slot, path)| path.clone().map(|path| (slot, path)))
        .collect()
}

fn read_payload(path: &Path) -> Result<FilePayload> {
    FilePayload::from_path(path).with_context(|| format!("reading {}", path.display()))
}

fn print_view(session: &mut UploadSession) {
    if let Some(view) = session.take_view() {
        print_lines(render::upload_lines(&view));
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

async fn ctrl_c() {
    // If the handler cannot be installed, follow until the batch finishes.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
