pub mod relocator;

pub use relocator::{archive_dir_for, ensure_directory, relocate, RelocationState, Relocator};
