// ABOUTME: Local staging of a release before transfer.
// ABOUTME: Copies the source tree aside and resolves exclusion patterns against the copy.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

use super::DeployError;
use crate::transport::shell::quote_local;
use crate::types::ReleaseId;

/// `<staging_root>/<host>/<release>`
pub fn staging_path(staging_root: &Path, host: &str, release: &ReleaseId) -> PathBuf {
    staging_root.join(host).join(release.as_str())
}

/// Command copying `from` to `staged`, replacing any leftover copy.
pub fn stage_cmd(from: &Path, staged: &Path) -> String {
    let parent = staged.parent().unwrap_or(staged);
    format!(
        "mkdir -p {} && rm -rf {staged} && cp -R {} {staged}",
        quote_local(parent),
        quote_local(from),
        staged = quote_local(staged)
    )
}

/// Command deleting `paths`, or None when there is nothing to delete.
pub fn remove_cmd(paths: &[PathBuf]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }

    let quoted: Vec<String> = paths.iter().map(|p| quote_local(p)).collect();
    Some(format!("rm -rf {}", quoted.join(" ")))
}

/// Expand exclusion patterns against the staged tree.
///
/// Patterns are relative to `staged`. A trailing `/` only matches
/// directories. Leading dots must be matched literally, so `*` does not pick
/// up dotfiles. Matches outside the staged tree are ignored.
pub fn excluded_paths(staged: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, DeployError> {
    let base = Pattern::escape(&staged.to_string_lossy());
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut matches: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let dirs_only = pattern.ends_with('/');
        let relative = pattern.trim_start_matches("./").trim_matches('/');
        if relative.is_empty() {
            return Err(DeployError::InvalidPattern {
                pattern: pattern.clone(),
                reason: "pattern would exclude the whole release".to_string(),
            });
        }
        if relative.split('/').any(|segment| segment == "..") {
            return Err(DeployError::InvalidPattern {
                pattern: pattern.clone(),
                reason: "pattern escapes the release directory".to_string(),
            });
        }

        let paths = glob::glob_with(&format!("{}/{}", base, relative), options).map_err(|e| {
            DeployError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            }
        })?;

        for path in paths.filter_map(Result::ok) {
            if dirs_only && !path.is_dir() {
                continue;
            }
            if !path.starts_with(staged) || path == staged {
                continue;
            }
            if !matches.contains(&path) {
                matches.push(path);
            }
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("app.rb"), "puts 1").unwrap();
        fs::write(root.join("debug.log"), "log").unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();
        fs::create_dir_all(root.join("tmp/cache")).unwrap();
        fs::write(root.join("tmp/cache/page.html"), "<html>").unwrap();
        fs::create_dir_all(root.join("log")).unwrap();
        fs::write(root.join("log/production.log"), "log").unwrap();
        dir
    }

    fn patterns(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn staging_path_is_keyed_by_host_and_release() {
        let release = ReleaseId::new("2012-09-20_14:04:39").unwrap();
        assert_eq!(
            staging_path(Path::new("/tmp"), "web1.example.com", &release),
            PathBuf::from("/tmp/web1.example.com/2012-09-20_14:04:39")
        );
    }

    #[test]
    fn stage_cmd_replaces_leftovers() {
        let cmd = stage_cmd(Path::new("./app"), Path::new("/tmp/web1/r1"));
        assert_eq!(
            cmd,
            "mkdir -p '/tmp/web1' && rm -rf '/tmp/web1/r1' && cp -R './app' '/tmp/web1/r1'"
        );
    }

    #[test]
    fn no_patterns_no_matches() {
        let dir = tree();
        assert!(excluded_paths(dir.path(), &[]).unwrap().is_empty());
        assert!(remove_cmd(&[]).is_none());
    }

    #[test]
    fn file_and_directory_patterns() {
        let dir = tree();
        let found = excluded_paths(dir.path(), &patterns(&["*.log", "tmp/"])).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("debug.log"), dir.path().join("tmp")]
        );
    }

    #[test]
    fn trailing_slash_only_matches_directories() {
        let dir = tree();
        let found = excluded_paths(dir.path(), &patterns(&["app.rb/"])).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn unmatched_pattern_is_a_noop() {
        let dir = tree();
        assert!(
            excluded_paths(dir.path(), &patterns(&["*.tmp", "missing/"]))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn star_skips_dotfiles() {
        let dir = tree();
        let found = excluded_paths(dir.path(), &patterns(&["*"])).unwrap();
        assert!(!found.contains(&dir.path().join(".env")));
        let found = excluded_paths(dir.path(), &patterns(&[".env"])).unwrap();
        assert_eq!(found, vec![dir.path().join(".env")]);
    }

    #[test]
    fn nested_patterns() {
        let dir = tree();
        let found = excluded_paths(dir.path(), &patterns(&["log/*.log", "./tmp/cache"])).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("log/production.log"),
                dir.path().join("tmp/cache"),
            ]
        );
    }

    #[test]
    fn duplicate_matches_listed_once() {
        let dir = tree();
        let found = excluded_paths(dir.path(), &patterns(&["*.log", "debug.*"])).unwrap();
        assert_eq!(found, vec![dir.path().join("debug.log")]);
    }

    #[test]
    fn whole_tree_pattern_rejected() {
        let dir = tree();
        let err = excluded_paths(dir.path(), &patterns(&["/"])).unwrap_err();
        assert!(matches!(err, DeployError::InvalidPattern { .. }));
    }

    #[test]
    fn parent_segments_rejected() {
        let dir = tree();
        let err = excluded_paths(dir.path(), &patterns(&["../*"])).unwrap_err();
        assert!(matches!(err, DeployError::InvalidPattern { .. }));
    }

    #[test]
    fn invalid_glob_rejected() {
        let dir = tree();
        let err = excluded_paths(dir.path(), &patterns(&["[.log"])).unwrap_err();
        assert!(matches!(err, DeployError::InvalidPattern { .. }));
    }

    #[test]
    fn remove_cmd_quotes_each_path() {
        let cmd = remove_cmd(&[PathBuf::from("/tmp/r1/debug.log"), PathBuf::from("/tmp/r1/tmp")]);
        assert_eq!(cmd.as_deref(), Some("rm -rf '/tmp/r1/debug.log' '/tmp/r1/tmp'"));
    }
}
