// ABOUTME: Command module aggregator for the cutover CLI.
// ABOUTME: Re-exports deploy, rollback, releases and task command handlers.

mod deploy;
mod releases;
mod rollback;
mod tasks;

pub use deploy::deploy;
pub use releases::releases;
pub use rollback::rollback;
pub use tasks::{list_tasks, run_task};
