//! Line-oriented rewriting of spec, rules and changelog files.
//!
//! Every replacement handed to [`apply_replacements`] is mandatory: if any key
//! matches no line the whole patch fails and the file is left untouched.

use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ordered mapping from a substring to look for to the full line that
/// replaces any line containing it.
///
/// Keys are tested in insertion order, but callers must still pick keys that
/// cannot both match one line. A replacement line that contains a different
/// key's text makes re-applying the set match the wrong line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementSet {
    entries: Vec<(String, String)>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required replacement, overriding an earlier one for the same key
    pub fn replace(mut self, key: impl Into<String>, line: impl Into<String>) -> Self {
        let key = key.into();
        let line = line.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = line,
            None => self.entries.push((key, line)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// What a successful patch changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    /// `(line number, key)` for each consumed key, 1-based
    pub replaced: Vec<(usize, String)>,
}

/// Apply every replacement in `replacements` to the file at `path`.
///
/// # Errors
/// * `IncompletePatch` naming each key no line contained; nothing is written
/// * `Filesystem` if the file cannot be read or written
pub fn apply_replacements(path: &Path, replacements: &ReplacementSet) -> Result<PatchSummary> {
    let input = fs::read_to_string(path).map_err(|e| ReleaseError::fs(path, e))?;
    let (output, summary) = patch_text(&input, replacements).map_err(|missing| {
        ReleaseError::IncompletePatch {
            path: path.to_path_buf(),
            missing,
        }
    })?;

    if summary.replaced.is_empty() {
        return Ok(summary);
    }

    fs::write(path, output).map_err(|e| ReleaseError::fs(path, e))?;
    Ok(summary)
}

/// Pure core of [`apply_replacements`]; `Err` carries the missed keys.
fn patch_text(
    input: &str,
    replacements: &ReplacementSet,
) -> std::result::Result<(String, PatchSummary), Vec<String>> {
    let mut pending: Vec<&(String, String)> = replacements.entries.iter().collect();
    let mut replaced = Vec::new();
    let mut output = String::with_capacity(input.len());

    for (index, segment) in input.split_inclusive('\n').enumerate() {
        let (content, separator) = split_separator(segment);

        let matched = pending
            .iter()
            .position(|(key, _)| content.contains(key.as_str()));

        match matched {
            Some(position) => {
                let (key, line) = pending.remove(position);
                info!(line = index + 1, from = content, to = line.as_str(), "replacing line");
                output.push_str(line);
                replaced.push((index + 1, key.clone()));
            }
            None => output.push_str(content),
        }
        output.push_str(separator);
    }

    if !pending.is_empty() {
        return Err(pending.into_iter().map(|(key, _)| key.clone()).collect());
    }

    Ok((output, PatchSummary { replaced }))
}

fn split_separator(segment: &str) -> (&str, &str) {
    if let Some(content) = segment.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = segment.strip_suffix('\n') {
        (content, "\n")
    } else {
        (segment, "")
    }
}

/// Replace every occurrence of `from` with `to` anywhere in the file.
///
/// # Errors
/// `IncompletePatch` if `from` does not occur at all.
pub fn replace_in_file(path: &Path, from: &str, to: &str) -> Result<usize> {
    let input = fs::read_to_string(path).map_err(|e| ReleaseError::fs(path, e))?;
    let count = input.matches(from).count();
    if count == 0 {
        return Err(ReleaseError::IncompletePatch {
            path: path.to_path_buf(),
            missing: vec![from.to_string()],
        });
    }

    debug!(path = %path.display(), from, to, count, "replacing text");
    fs::write(path, input.replace(from, to)).map_err(|e| ReleaseError::fs(path, e))?;
    Ok(count)
}
