// ABOUTME: Remote filesystem layout of a deployed application.
// ABOUTME: Builds the paths and shell commands for releases, skip markers and the current pointer.

use crate::transport::shell::{quote_arg, quote_path};
use crate::types::ReleaseId;

/// Paths under a remote base directory:
///
/// ```text
/// <base>/current                        -> <base>/releases/<release_id>
/// <base>/releases/<release_id>/...
/// <base>/releases/skip-<release_id>/...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    base: String,
}

impl RemoteLayout {
    pub fn new(base: &str) -> Self {
        let trimmed = base.trim_end_matches('/');
        let base = if trimmed.is_empty() { "/" } else { trimmed };
        Self {
            base: base.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, child: &str) -> String {
        if self.base == "/" {
            format!("/{}", child)
        } else {
            format!("{}/{}", self.base, child)
        }
    }

    pub fn current(&self) -> String {
        self.join("current")
    }

    pub fn releases_dir(&self) -> String {
        self.join("releases")
    }

    pub fn release_dir(&self, release: &ReleaseId) -> String {
        format!("{}/{}", self.releases_dir(), release)
    }

    pub fn skipped_dir(&self, release: &ReleaseId) -> String {
        format!("{}/{}", self.releases_dir(), release.skipped_name())
    }

    pub fn ensure_releases_dir_cmd(&self) -> String {
        format!("mkdir -p {}", quote_path(&self.releases_dir()))
    }

    /// Succeeds iff a release (or anything else) already has this name.
    pub fn release_exists_cmd(&self, release: &ReleaseId) -> String {
        format!("test -e {}", quote_path(&self.release_dir(release)))
    }

    /// Comma separated listing of the releases directory. A missing
    /// directory lists as empty rather than failing.
    pub fn list_cmd(&self) -> String {
        let dir = quote_path(&self.releases_dir());
        format!("if [ -d {dir} ]; then ls -m {dir}; fi")
    }

    /// Replace the current pointer in a single remote command.
    pub fn cutover_cmd(&self, release: &ReleaseId) -> String {
        let current = quote_path(&self.current());
        format!(
            "rm -f {current} && ln -s {} {current}",
            quote_path(&self.release_dir(release))
        )
    }

    pub fn retire_cmd(&self, release: &ReleaseId) -> String {
        format!(
            "mv {} {}",
            quote_path(&self.release_dir(release)),
            quote_path(&self.skipped_dir(release))
        )
    }

    /// Make an uploaded hook executable and run it with the release id as `$1`.
    pub fn hook_cmd(hook_path: &str, release: &ReleaseId) -> String {
        let hook = quote_path(hook_path);
        format!("chmod +x {hook} && exec {hook} {}", quote_arg(release.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> ReleaseId {
        ReleaseId::new("2012-09-20_14:04:39").unwrap()
    }

    #[test]
    fn paths_under_base() {
        let layout = RemoteLayout::new("/srv/app/");
        assert_eq!(layout.base(), "/srv/app");
        assert_eq!(layout.current(), "/srv/app/current");
        assert_eq!(layout.releases_dir(), "/srv/app/releases");
        assert_eq!(
            layout.release_dir(&release()),
            "/srv/app/releases/2012-09-20_14:04:39"
        );
        assert_eq!(
            layout.skipped_dir(&release()),
            "/srv/app/releases/skip-2012-09-20_14:04:39"
        );
    }

    #[test]
    fn root_base() {
        let layout = RemoteLayout::new("/");
        assert_eq!(layout.current(), "/current");
        assert_eq!(layout.releases_dir(), "/releases");
    }

    #[test]
    fn cutover_is_one_command() {
        let layout = RemoteLayout::new("/srv/app");
        assert_eq!(
            layout.cutover_cmd(&release()),
            "rm -f '/srv/app/current' && ln -s '/srv/app/releases/2012-09-20_14:04:39' '/srv/app/current'"
        );
    }

    #[test]
    fn home_relative_base_is_expanded_by_remote_shell() {
        let layout = RemoteLayout::new("~/app");
        assert_eq!(
            layout.ensure_releases_dir_cmd(),
            "mkdir -p \"$HOME\"/'app/releases'"
        );
    }

    #[test]
    fn retire_renames_in_place() {
        let layout = RemoteLayout::new("/srv/app");
        assert_eq!(
            layout.retire_cmd(&release()),
            "mv '/srv/app/releases/2012-09-20_14:04:39' '/srv/app/releases/skip-2012-09-20_14:04:39'"
        );
    }

    #[test]
    fn listing_tolerates_missing_directory() {
        let layout = RemoteLayout::new("/srv/app");
        assert_eq!(
            layout.list_cmd(),
            "if [ -d '/srv/app/releases' ]; then ls -m '/srv/app/releases'; fi"
        );
    }

    #[test]
    fn hook_receives_release_argument() {
        assert_eq!(
            RemoteLayout::hook_cmd("/tmp/before.sh", &release()),
            "chmod +x '/tmp/before.sh' && exec '/tmp/before.sh' 2012-09-20_14:04:39"
        );
    }
}
