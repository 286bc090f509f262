//! Regex driven text substitution with an explicit, fallible lookup.
//!
//! Every match of a [`Pattern`] is handed to a lookup which must return the
//! replacement. A match with no replacement is an error rather than an empty
//! string: it means the pattern and the [`StringTable`] disagree.

mod model;

pub use crate::model::{Pattern, StringTable};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubstituteError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: fancy_regex::Error,
    },
    #[error("pattern `{pattern}` failed while matching: {source}")]
    Match {
        pattern: String,
        source: fancy_regex::Error,
    },
    #[error("no replacement for {matched:?} (matched by `{pattern}`)")]
    UnmappedMatch { pattern: String, matched: String },
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Result of [`replace_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub text: String,
    pub count: usize,
}

/// Replace every non-overlapping match of `pattern`, left to right.
///
/// Text between matches is copied verbatim, so line endings survive as-is.
pub fn replace_all<'r, F>(
    pattern: &Pattern,
    text: &str,
    mut lookup: F,
) -> Result<Replaced, SubstituteError>
where
    F: FnMut(&str) -> Option<&'r str>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for found in pattern.regex().find_iter(text) {
        let found = found.map_err(|source| SubstituteError::Match {
            pattern: pattern.as_str().to_string(),
            source,
        })?;
        let matched = found.as_str();
        let replacement = lookup(matched).ok_or_else(|| SubstituteError::UnmappedMatch {
            pattern: pattern.as_str().to_string(),
            matched: matched.to_string(),
        })?;

        out.push_str(&text[last..found.start()]);
        out.push_str(replacement);
        last = found.end();
        count += 1;
    }
    out.push_str(&text[last..]);

    Ok(Replaced { text: out, count })
}

/// Rewrite `path` in place, replacing matches of `pattern` through `table`.
///
/// The new content is built completely before anything is written, so a
/// lookup failure leaves the file untouched. Files without a match are not
/// rewritten. Returns the number of replacements.
pub fn substitute_file(
    path: &Path,
    pattern: &Pattern,
    table: &StringTable,
) -> Result<usize, SubstituteError> {
    let content = fs::read_to_string(path).map_err(|source| SubstituteError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let replaced = replace_all(pattern, &content, |matched| table.get(matched))?;
    if replaced.count == 0 {
        return Ok(0);
    }

    fs::write(path, replaced.text).map_err(|source| SubstituteError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(replaced.count)
}
