//! Start-script path validation
//!
//! Runs before anything is spawned. Rejections are reported as error logs
//! naming the worker and the path; the boolean result is the only signal
//! handed back to the caller.

use std::path::Path;

use shared::worker_error;

/// Script extensions the generic launcher knows how to run
pub const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bat", "py"];

/// Base name of the user-settings script that is commonly picked by mistake
pub const RESERVED_SCRIPT_NAME: &str = "webui-user";

/// Script to point at instead of [`RESERVED_SCRIPT_NAME`]
pub const RESERVED_SCRIPT_ALTERNATIVE: &str = "webui";

const MIN_PATH_LEN: usize = 5;

/// Characters that may not appear in a path outside the drive prefix
pub fn is_forbidden_path_char(c: char) -> bool {
    (c as u32) < 32 || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*')
}

/// Text after the last `sep`, or the whole string if there is none
pub(crate) fn after_last(s: &str, sep: char) -> &str {
    match s.rfind(sep) {
        Some(idx) => &s[idx + sep.len_utf8()..],
        None => s,
    }
}

/// Text before the last `sep`, or the whole string if there is none
pub(crate) fn before_last(s: &str, sep: char) -> &str {
    match s.rfind(sep) {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Drop a leading `X:` drive designator
fn strip_drive_prefix(path: &str) -> &str {
    let mut indices = path.char_indices();
    match (indices.next(), indices.next()) {
        (Some(_), Some((idx, ':'))) => &path[idx + 1..],
        _ => path,
    }
}

fn forbidden_chars_in(path: &str) -> String {
    let mut found = String::new();
    for c in path.chars().filter(|c| is_forbidden_path_char(*c)) {
        let shown: String = c.escape_debug().collect();
        if !found.contains(&shown) {
            found.push_str(&shown);
        }
    }
    found
}

/// Check a candidate start script before it is launched
///
/// `path` uses `/` separators; `ext` is the text after its last `.`.
/// A relative `path` is looked up from the current directory.
pub fn is_valid_start_path(label: &str, path: &str, ext: &str) -> bool {
    is_valid_start_path_in(label, path, ext, Path::new("."))
}

/// Same as [`is_valid_start_path`], resolving a relative `path` against `base_dir`
pub fn is_valid_start_path_in(label: &str, path: &str, ext: &str, base_dir: &Path) -> bool {
    if path.chars().count() < MIN_PATH_LEN {
        return false;
    }

    if !SCRIPT_EXTENSIONS.contains(&ext) {
        worker_error!(
            label,
            "Refusing init of {} with non-script target. Please verify your start script location. Path was '{}', which does not end in the expected 'py', 'bat', or 'sh'.",
            label,
            path
        );
        return false;
    }

    if before_last(after_last(path, '/'), '.') == RESERVED_SCRIPT_NAME {
        worker_error!(
            label,
            "Refusing init of {} with '{}' target script. Please use the '{}' script instead.",
            label,
            RESERVED_SCRIPT_NAME,
            RESERVED_SCRIPT_ALTERNATIVE
        );
        return false;
    }

    let sub_path = strip_drive_prefix(path);
    if sub_path.chars().any(is_forbidden_path_char) {
        worker_error!(
            label,
            "Failed init of {} with script target '{}' because that file path contains invalid characters ( {} ). Please verify your start script location.",
            label,
            path,
            forbidden_chars_in(sub_path)
        );
        return false;
    }

    if !base_dir.join(path).is_file() {
        worker_error!(
            label,
            "Failed init of {} with script target '{}' because that file does not exist. Please verify your start script location.",
            label,
            path
        );
        return false;
    }

    true
}
