//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod copy;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use copy::{run_copy, CopyOverrides};
