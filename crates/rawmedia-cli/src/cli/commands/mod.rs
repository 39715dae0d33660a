//! CLI command handlers. Each command is in its own file.

mod checksum;
mod fetch;
mod inspect;
mod verify;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use inspect::run_inspect;
pub use verify::run_verify;
