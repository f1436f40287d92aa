//! Command-line front end for the Strategic Grid backend.
pub mod cli;
pub mod commands;
pub mod effects;
pub mod render;
pub mod session;
pub mod settings;

pub use effects::EffectRunner;
pub use session::UploadSession;
pub use settings::{FileConfig, Settings};
