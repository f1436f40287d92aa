use crate::{AppState, Effect, Msg, UploadStatus};

const MISSING_BATCH_ID: &str = "server accepted the upload but returned no batch id";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { slot, path } => {
            if !state.upload_status().is_locked() {
                state.set_file(slot, path);
            }
            Vec::new()
        }
        Msg::FileCleared(slot) => {
            if !state.upload_status().is_locked() {
                state.clear_file(slot);
            }
            Vec::new()
        }
        Msg::StartIndexChanged(value) => {
            if !state.upload_status().is_locked() {
                state.set_start_index(value);
            }
            Vec::new()
        }
        Msg::EndIndexChanged(value) => {
            if !state.upload_status().is_locked() {
                state.set_end_index(value);
            }
            Vec::new()
        }
        Msg::UploadClicked => {
            // A failed upload may be retried; an in-flight or accepted one may not.
            if state.is_ready() && !state.upload_status().is_locked() {
                let (start_index, end_index) = state.bounds();
                state.set_upload(UploadStatus::Uploading);
                vec![Effect::SubmitBatch {
                    files: state.selected_files(),
                    start_index,
                    end_index,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::UploadSucceeded { batch_id } => {
            if state.upload_status() != &UploadStatus::Uploading {
                Vec::new()
            } else if batch_id.is_blank() {
                state.set_upload(UploadStatus::Failed {
                    message: MISSING_BATCH_ID.to_string(),
                });
                Vec::new()
            } else {
                state.set_upload(UploadStatus::Succeeded {
                    batch_id: batch_id.clone(),
                });
                state.start_monitoring(batch_id.clone());
                vec![Effect::StartMonitoring { batch_id }]
            }
        }
        Msg::UploadFailed { message } => {
            if state.upload_status() == &UploadStatus::Uploading {
                state.set_upload(UploadStatus::Failed { message });
            }
            Vec::new()
        }
        Msg::ProgressReceived { batch_id, progress } => {
            if state.monitored_batch() == Some(&batch_id) {
                state.replace_progress(progress);
            }
            Vec::new()
        }
        Msg::MonitorClosed => {
            if state.monitored_batch().is_some() {
                state.stop_monitoring();
                vec![Effect::StopMonitoring]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}
