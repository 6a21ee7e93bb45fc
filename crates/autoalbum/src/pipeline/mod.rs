pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod progress;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::PipelineError;
pub use gate::{AlwaysContinue, ConfirmationGate, StdinGate, CONTINUE_PROMPT};
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::Pipeline;
