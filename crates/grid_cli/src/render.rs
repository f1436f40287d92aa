use grid_core::{AppViewModel, BatchId, ProgressView, UploadStatus};

const BAR_WIDTH: usize = 20;

/// File slots, row bounds and upload status.
pub fn upload_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines: Vec<String> = view
        .slots
        .iter()
        .map(|slot| match &slot.file_name {
            Some(name) => format!("  [x] {:<16} {}", slot.label, name),
            None => format!("  [ ] {:<16} (missing)", slot.label),
        })
        .collect();

    if !view.start_index.trim().is_empty() || !view.end_index.trim().is_empty() {
        lines.push(format!(
            "  Rows: {} .. {}",
            bound_or_dash(&view.start_index),
            bound_or_dash(&view.end_index)
        ));
    }

    lines.push(status_line(view));
    lines
}

fn status_line(view: &AppViewModel) -> String {
    match &view.upload {
        UploadStatus::Idle if view.ready => "Ready to upload".to_string(),
        UploadStatus::Idle => {
            let labels: Vec<&str> = view.missing.iter().map(|slot| slot.label()).collect();
            format!("Missing required files: {}", labels.join(", "))
        }
        UploadStatus::Uploading => "Uploading batch...".to_string(),
        UploadStatus::Succeeded { batch_id } => format!("Batch {batch_id} accepted"),
        UploadStatus::Failed { message } => format!("Upload failed: {message}"),
    }
}

/// Overall status with a bar, then one row per pipeline stage.
pub fn progress_lines(batch_id: Option<&BatchId>, progress: &ProgressView) -> Vec<String> {
    let mut lines = Vec::with_capacity(progress.stages.len() + 2);
    if let Some(batch_id) = batch_id {
        lines.push(format!("Batch {batch_id}"));
    }
    lines.push(format!(
        "STATUS: {} {} {:>3}%",
        progress.status.as_str().to_uppercase(),
        bar(progress.percent),
        progress.percent
    ));
    lines.extend(progress.stages.iter().map(|row| {
        format!(
            "  {:<16} {}",
            row.name,
            row.status.as_str().to_uppercase()
        )
    }));
    lines
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn bound_or_dash(raw: &str) -> &str {
    match raw.trim() {
        "" => "-",
        trimmed => trimmed,
    }
}
