use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use grid_client::{
    BatchApi, BatchMonitor, BatchSubmission, BatchSubmitter, FilePayload, ProgressPoller,
};
use grid_core::{Effect, FileSlot, Msg};
use grid_logging::{grid_debug, grid_error, grid_info};

/// Executes effects emitted by `update` and turns their outcomes into messages.
pub struct EffectRunner {
    submitter: BatchSubmitter,
    monitor: BatchMonitor,
    follow_progress: bool,
}

impl EffectRunner {
    pub fn new(api: Arc<dyn BatchApi>, poll_interval: Duration) -> Self {
        Self {
            submitter: BatchSubmitter::new(api.clone()),
            monitor: BatchMonitor::new(ProgressPoller::new(api, poll_interval)),
            follow_progress: true,
        }
    }

    /// When disabled, `StartMonitoring` is acknowledged but no poller starts.
    pub fn with_follow_progress(mut self, follow: bool) -> Self {
        self.follow_progress = follow;
        self
    }

    pub fn monitor(&self) -> &BatchMonitor {
        &self.monitor
    }

    pub async fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut replies = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitBatch {
                    files,
                    start_index,
                    end_index,
                } => {
                    let reply = self.submit(files, start_index, end_index).await;
                    replies.push(reply);
                }
                Effect::StartMonitoring { batch_id } => {
                    if self.follow_progress {
                        grid_info!("Monitoring batch {}", batch_id);
                        self.monitor.watch(Some(batch_id));
                    } else {
                        grid_debug!("Not following batch {}", batch_id);
                    }
                }
                Effect::StopMonitoring => {
                    self.monitor.stop();
                }
            }
        }
        replies
    }

    async fn submit(
        &self,
        files: Vec<(FileSlot, PathBuf)>,
        start_index: Option<String>,
        end_index: Option<String>,
    ) -> Msg {
        let mut submission = match read_submission(files) {
            Ok(submission) => submission,
            Err(message) => {
                grid_error!("{}", message);
                return Msg::UploadFailed { message };
            }
        };
        submission.set_bounds(start_index, end_index);
        match self.submitter.submit(&submission).await {
            Ok(receipt) => Msg::UploadSucceeded {
                batch_id: receipt.batch_id,
            },
            Err(err) => Msg::UploadFailed {
                message: err.to_string(),
            },
        }
    }
}

/// Payloads are read at submit time so the upload matches the current selection.
fn read_submission(files: Vec<(FileSlot, PathBuf)>) -> Result<BatchSubmission, String> {
    let mut submission = BatchSubmission::new();
    for (slot, path) in files {
        let payload = FilePayload::from_path(&path)
            .map_err(|err| format!("could not read {}: {err}", path.display()))?;
        submission.set_file(slot, payload);
    }
    Ok(submission)
}
