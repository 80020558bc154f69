//! Top-level member splitting for composite spores.
//!
//! The tokenizer never matches brackets. It counts literal occurrences of the prefix and suffix
//! tokens and only splits on a separator while both counts agree. Payload text must therefore
//! not contain `{|`, `|}` or `_|_`; nothing is escaped.

use crate::spore::{MEMBER_SEPARATOR, SPORE_PREFIX, SPORE_SUFFIX};
use crate::{Error, Result};
use log::trace;

/// Splits the text between a composite's outer delimiters into its top-level members.
///
/// Empty input yields no members, so `{||}` is a childless composite. Text without any
/// separator is a single member.
///
/// # Errors
///
/// Returns [`Error::MalformedFrozenString`] if the final member has unbalanced delimiters.
///
/// # Examples
///
/// ```rust
/// use spore::tokenizer::split_members;
///
/// assert_eq!(split_members("a_|_b").unwrap(), vec!["a", "b"]);
/// assert_eq!(split_members("{|a_|_b|}_|_c").unwrap(), vec!["{|a_|_b|}", "c"]);
/// assert_eq!(split_members("solo").unwrap(), vec!["solo"]);
/// assert!(split_members("").unwrap().is_empty());
/// ```
pub fn split_members(inner: &str) -> Result<Vec<&str>> {
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    if !inner.contains(MEMBER_SEPARATOR) {
        return Ok(vec![inner]);
    }

    let bytes = inner.as_bytes();
    let mut members = Vec::new();
    let mut start = 0;
    let mut opens = 0usize;
    let mut closes = 0usize;
    let mut index = 0;

    while index < bytes.len() {
        let rest = &bytes[index..];
        if rest.starts_with(SPORE_PREFIX.as_bytes()) {
            opens += 1;
        }
        if rest.starts_with(SPORE_SUFFIX.as_bytes()) {
            closes += 1;
        }
        if opens == closes && rest.starts_with(MEMBER_SEPARATOR.as_bytes()) {
            members.push(&inner[start..index]);
            index += MEMBER_SEPARATOR.len();
            start = index;
            opens = 0;
            closes = 0;
            continue;
        }
        index += 1;
    }

    if opens != closes {
        return Err(Error::malformed(
            &inner[start..],
            "unbalanced composite delimiters",
        ));
    }
    members.push(&inner[start..]);

    trace!("split {} bytes into {} members", inner.len(), members.len());
    Ok(members)
}
