pub mod batch_convert;

pub use batch_convert::{run_batch, run_batch_with, BatchOutcome};
pub use shared_utils::{AppError, BatchConfig, Result};
