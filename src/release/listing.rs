// ABOUTME: Parsing of the remote release listing.
// ABOUTME: Accepts comma, whitespace or mixed separators and drops skip-marked releases.

use crate::types::{ReleaseId, SKIP_MARKER};

/// Active releases in the order the listing names them.
pub fn parse_listing(raw: &str) -> Vec<ReleaseId> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty() && !token.starts_with(SKIP_MARKER))
        .filter_map(|token| match ReleaseId::new(token) {
            Ok(release) => Some(release),
            Err(e) => {
                tracing::debug!("Ignoring listing entry {:?}: {}", token, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[&str]) -> Vec<ReleaseId> {
        raw.iter().map(|r| ReleaseId::new(r).unwrap()).collect()
    }

    #[test]
    fn parses_ls_m_output() {
        let raw = "2012-09-20_13:59:15, 2012-09-20_14:04:39, skip-2012-09-21_09:00:00\n";
        assert_eq!(
            parse_listing(raw),
            ids(&["2012-09-20_13:59:15", "2012-09-20_14:04:39"])
        );
    }

    #[test]
    fn parses_wrapped_listing() {
        let raw = "r1, r2,\nr3, skip-r4,\n r5\n";
        assert_eq!(parse_listing(raw), ids(&["r1", "r2", "r3", "r5"]));
    }

    #[test]
    fn parses_whitespace_only_listing() {
        assert_eq!(parse_listing("r1 r2\tr3\n"), ids(&["r1", "r2", "r3"]));
    }

    #[test]
    fn empty_listing() {
        assert!(parse_listing("").is_empty());
        assert!(parse_listing(" ,\n").is_empty());
    }

    fn release_name() -> impl Strategy<Value = String> {
        "[0-9]{4}-[0-9]{2}-[0-9]{2}_[0-9]{2}:[0-9]{2}:[0-9]{2}"
    }

    fn separator() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(", ".to_string()),
            Just(",".to_string()),
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just(",\n".to_string()),
            Just(" , \t".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn never_lists_skipped_releases(
            entries in prop::collection::vec((release_name(), any::<bool>(), separator()), 0..20)
        ) {
            let mut raw = String::new();
            let mut expected = Vec::new();
            for (name, skipped, sep) in &entries {
                if *skipped {
                    raw.push_str(SKIP_MARKER);
                } else {
                    expected.push(ReleaseId::new(name).unwrap());
                }
                raw.push_str(name);
                raw.push_str(sep);
            }

            let parsed = parse_listing(&raw);
            prop_assert!(parsed.iter().all(|r| !r.as_str().starts_with(SKIP_MARKER)));
            prop_assert_eq!(parsed, expected);
        }
    }
}
