// ABOUTME: Quoting helpers for building `sh -c` command lines.
// ABOUTME: Paths are always single-quoted; a leading `~/` in a remote path is left to the shell as `"$HOME"`.

use std::path::Path;

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument, leaving plain words untouched.
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote a path, always. A leading `~` or `~/` becomes `"$HOME"` so the
/// shell running the command expands it to that user's home directory.
pub fn quote_path(path: &str) -> String {
    if path == "~" {
        return "\"$HOME\"".to_string();
    }

    match path.strip_prefix("~/") {
        Some("") => "\"$HOME\"/".to_string(),
        Some(rest) => format!("\"$HOME\"/'{}'", escape_single_quote_content(rest)),
        None => format!("'{}'", escape_single_quote_content(path)),
    }
}

/// Quote a local filesystem path literally.
///
/// Local paths have `~` expanded when the configuration is resolved, so the
/// shell sees the same path the process does.
pub fn quote_local(path: &Path) -> String {
    format!("'{}'", escape_single_quote_content(&path.to_string_lossy()))
}
