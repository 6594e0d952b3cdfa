use std::path::Path;

use tokio::fs;
use tracing::debug;

use super::error::PatchError;

/// A requested range that does not fit the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeViolation {
    pub start: i64,
    pub end: i64,
    pub line_count: usize,
}

/// Split on `\n`, dropping one `\r` before each break. A trailing newline
/// produces a trailing empty line, which counts toward the line total. A `\r`
/// not followed by `\n` is content.
pub fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(idx) = rest.find('\n') {
        let line = &rest[..idx];
        lines.push(line.strip_suffix('\r').unwrap_or(line));
        rest = &rest[idx + 1..];
    }
    lines.push(rest);
    lines
}

/// Leading run of spaces and tabs.
pub fn leading_indentation(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !matches!(c, ' ' | '\t'))
        .map_or(line.len(), |(idx, _)| idx);
    &line[..end]
}

/// Prefix every `\n`-separated line of `text`, blank ones included.
pub fn indent_block(text: &str, indent: &str) -> String {
    text.split('\n')
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace the 1-based inclusive range `start..=end` of `content` with
/// `patch_text`, re-indented to match line `start`. Output lines are joined
/// with `\n` whatever the input used.
pub fn splice_range(
    content: &str,
    start: i64,
    end: i64,
    patch_text: &str,
) -> Result<String, RangeViolation> {
    let lines = split_lines(content);
    let line_count = lines.len();
    let violation = RangeViolation {
        start,
        end,
        line_count,
    };

    let (first, last) = checked_bounds(start, end, line_count).ok_or(violation)?;

    let block = indent_block(patch_text, leading_indentation(lines[first]));

    let mut spliced: Vec<&str> = Vec::with_capacity(line_count - (last - first) + 1);
    spliced.extend_from_slice(&lines[..first]);
    spliced.push(&block);
    spliced.extend_from_slice(&lines[last..]);

    Ok(spliced.join("\n"))
}

/// Zero-based `[first, last)` slice bounds for a valid 1-based inclusive range.
fn checked_bounds(start: i64, end: i64, line_count: usize) -> Option<(usize, usize)> {
    if start <= 0 || start > end {
        return None;
    }
    let last = usize::try_from(end).ok()?;
    if last > line_count {
        return None;
    }
    let first = usize::try_from(start - 1).ok()?;
    Some((first, last))
}

/// Read `path`, replace lines `start..=end` with `patch_text` and overwrite
/// the file in place. Nothing is written when the range is invalid.
pub async fn apply_line_range(
    path: &Path,
    start: i64,
    end: i64,
    patch_text: &str,
) -> Result<(), PatchError> {
    let existing = fs::read_to_string(path)
        .await
        .map_err(|err| PatchError::Io {
            action: "read",
            path: path.to_path_buf(),
            source: err,
        })?;

    let updated = splice_range(&existing, start, end, patch_text).map_err(|violation| {
        PatchError::InvalidRange {
            path: path.to_path_buf(),
            start: violation.start,
            end: violation.end,
            line_count: violation.line_count,
        }
    })?;

    fs::write(path, updated.as_bytes())
        .await
        .map_err(|err| PatchError::Io {
            action: "write",
            path: path.to_path_buf(),
            source: err,
        })?;

    debug!(
        path = %path.display(),
        start,
        end,
        bytes = updated.len(),
        "Applied line-range patch"
    );
    Ok(())
}
