// ABOUTME: Releases command implementation.
// ABOUTME: Lists the active releases on every server of a group.

use cutover::diagnostics::{Diagnostics, Warning};
use cutover::error::Result;
use cutover::output::Output;
use cutover::release::Deployer;
use cutover::tasks::Group;
use serde_json::json;

pub async fn releases(group: Group, output: Output) -> Result<()> {
    let mut diag = Diagnostics::default();

    for target in group.targets.iter() {
        let deployer = Deployer::new(target.clone());
        if !deployer.can_deploy() {
            diag.warn(Warning::target_skipped(format!(
                "skipping {}, deployer is not configured for it",
                target.host
            )));
            continue;
        }

        output.progress(&format!("  → Listing releases on {}...", target.host));
        let result = deployer.releases().await;

        // Disconnect SSH session (non-fatal if it fails)
        if let Err(e) = deployer.close().await {
            diag.warn(Warning::ssh_disconnect(format!(
                "SSH disconnect failed for {}: {}",
                target.host, e
            )));
        }

        let releases = match result {
            Ok(releases) => releases,
            Err(e) => {
                for warning in diag.warnings() {
                    output.warning(&warning.message);
                }
                return Err(e.into());
            }
        };
        let ids: Vec<&str> = releases.iter().map(|r| r.as_str()).collect();

        let mut text = format!("{}:", target.host);
        for id in &ids {
            text.push_str("\n  ");
            text.push_str(id);
        }
        output.data(
            "releases",
            &text,
            &json!({ "host": target.host, "releases": ids }),
        );
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    Ok(())
}
