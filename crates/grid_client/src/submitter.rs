use std::sync::Arc;

use grid_logging::{grid_info, grid_warn};

use crate::{BatchApi, BatchReceipt, BatchSubmission, SubmitError};

/// Validates a batch and sends it with a single request.
///
/// Retrying is the caller's decision; a failed submission can be passed to
/// [`BatchSubmitter::submit`] again once corrected.
#[derive(Clone)]
pub struct BatchSubmitter {
    api: Arc<dyn BatchApi>,
}

impl BatchSubmitter {
    pub fn new(api: Arc<dyn BatchApi>) -> Self {
        Self { api }
    }

    pub async fn submit(&self, submission: &BatchSubmission) -> Result<BatchReceipt, SubmitError> {
        let ready = match submission.validate() {
            Ok(ready) => ready,
            Err(err) => {
                grid_warn!("Batch not submitted: {}", err);
                return Err(err);
            }
        };

        grid_info!(
            "Submitting batch bytes={} start_index={:?} end_index={:?}",
            ready.total_bytes(),
            ready.start_index(),
            ready.end_index()
        );

        match self.api.upload_batch(&ready).await {
            Ok(receipt) => {
                grid_info!("Batch accepted batch_id={}", receipt.batch_id);
                Ok(receipt)
            }
            Err(err) => {
                grid_warn!("Batch submission failed: {}", err);
                Err(err)
            }
        }
    }
}
