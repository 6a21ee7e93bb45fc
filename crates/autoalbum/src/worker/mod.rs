pub mod batch;
pub mod record;
pub mod scanner;

pub use batch::{BatchRunner, BatchSummary};
pub use record::{FileOutcome, FileResult, ImageRecord};
pub use scanner::DirectoryScanner;
