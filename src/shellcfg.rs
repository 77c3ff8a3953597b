//! Shell configuration file editing.
//!
//! Edits are pure transforms over the whole file contents, written back
//! atomically (temp file + rename). Repeat runs are fixpoints: a block
//! already present is never appended twice, a line already rewritten is
//! left alone.

use std::path::Path;

use regex_lite::Regex;

use crate::error::Result;
use crate::runner::CommandRunner;

/// Append `block` to `contents` unless `marker` already occurs in it.
///
/// The marker is a line that uniquely identifies the block (typically a
/// comment heading the block), so partial user edits below it do not
/// trigger duplication.
pub fn append_block_if_absent(contents: &str, marker: &str, block: &str) -> String {
    if contents.contains(marker) {
        return contents.to_string();
    }

    let mut out = contents.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(block.trim_end());
    out.push('\n');
    out
}

/// Replace every line matching `pattern` with `replacement`. When no line
/// matches, the contents are returned unchanged (use together with
/// [`append_block_if_absent`] when the line must exist afterwards).
pub fn replace_line_matching(contents: &str, pattern: &Regex, replacement: &str) -> String {
    let mut changed = false;
    let mut out: Vec<&str> = Vec::new();
    for line in contents.lines() {
        if pattern.is_match(line) {
            changed = true;
            out.push(replacement);
        } else {
            out.push(line);
        }
    }

    if !changed {
        return contents.to_string();
    }

    let mut result = out.join("\n");
    if contents.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Read a file (empty contents if missing), apply `transform`, and write
/// the result back atomically only when it differs. Returns whether the
/// file was modified.
pub fn edit_file(
    runner: &dyn CommandRunner,
    path: &Path,
    transform: impl FnOnce(&str) -> String,
) -> Result<bool> {
    let contents = runner.read_file(path)?.unwrap_or_default();

    let updated = transform(&contents);
    if updated == contents {
        return Ok(false);
    }

    runner.write_file_atomic(path, &updated)?;
    Ok(true)
}
