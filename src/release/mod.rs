// ABOUTME: Timestamped releases on a remote host with an atomically switched current symlink.
// ABOUTME: Staging, transfer, hooks, cutover, listing and rollback.

mod deployer;
mod error;
mod hooks;
mod layout;
mod listing;
mod staging;

pub use deployer::{DeployReport, Deployer, RollbackOutcome};
pub use error::{DeployError, DeployErrorKind};
pub use hooks::{HookPoint, HookReport, run_hook};
pub use layout::RemoteLayout;
pub use listing::parse_listing;
pub use staging::{excluded_paths, remove_cmd, stage_cmd, staging_path};
