//! Grid core: batch domain types and the pure upload-session state machine.
mod batch;
mod effect;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;

pub use batch::{BatchId, FileSlot};
pub use effect::Effect;
pub use msg::Msg;
pub use progress::{BatchProgress, PipelineStage, RunStatus, StageStatus};
pub use state::{AppState, UploadStatus};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, SlotView, StageRow};
