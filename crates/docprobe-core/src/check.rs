//! Scenario checks.
//!
//! Text checks are conditional: client-rendered pages may not have populated
//! an element by capture time, so an empty element is reported as
//! [`TextCheck::Skipped`] and only non-empty text is compared.

use regex::Regex;

use crate::baseline::{BaselineCheck, BaselineMode, BaselineStore};
use crate::error::ProbeError;
use crate::naming::fold_heading;

/// Outcome of a conditional text check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCheck {
    Verified,
    Skipped,
}

pub fn expect_status(actual: u16, expected: u16) -> Result<(), ProbeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ProbeError::AssertionFailed(format!(
            "expected HTTP status {expected}, got {actual}"
        )))
    }
}

/// Require `text` to match `pattern`, unless `text` is empty.
pub fn expect_match_if_present(
    text: &str,
    pattern: &Regex,
    what: &str,
) -> Result<TextCheck, ProbeError> {
    if text.is_empty() {
        return Ok(TextCheck::Skipped);
    }
    if pattern.is_match(text) {
        Ok(TextCheck::Verified)
    } else {
        Err(ProbeError::AssertionFailed(format!(
            "{what} {text:?} does not match /{}/",
            pattern.as_str()
        )))
    }
}

/// Require the folded `heading` to contain `fragment`, unless either is empty.
pub fn expect_contains_if_present(
    heading: &str,
    fragment: &str,
    what: &str,
) -> Result<TextCheck, ProbeError> {
    if heading.is_empty() || fragment.is_empty() {
        return Ok(TextCheck::Skipped);
    }
    if fold_heading(heading).contains(fragment) {
        Ok(TextCheck::Verified)
    } else {
        Err(ProbeError::AssertionFailed(format!(
            "{what} {heading:?} does not contain {fragment:?}"
        )))
    }
}

/// Compare a table count with the store, or record it in accept mode.
///
/// Returns a short note for the report on success.
pub fn expect_baseline(
    store: &mut BaselineStore,
    key: &str,
    actual: usize,
    mode: BaselineMode,
) -> Result<String, ProbeError> {
    if mode == BaselineMode::Accept {
        return Ok(match store.accept(key, actual) {
            Some(previous) if previous != actual => {
                format!("baseline updated: {previous} -> {actual} tables")
            }
            Some(_) => format!("{actual} tables (unchanged)"),
            None => format!("baseline recorded: {actual} tables"),
        });
    }

    match store.check(key, actual) {
        BaselineCheck::Match => Ok(format!("{actual} tables")),
        BaselineCheck::Mismatch { expected, actual } => Err(ProbeError::AssertionFailed(format!(
            "table count for {key} changed: baseline {expected}, now {actual} \
             (run `docprobe baseline accept` to record the new count)"
        ))),
        BaselineCheck::Missing { actual } => Err(ProbeError::AssertionFailed(format!(
            "no table-count baseline for {key} (observed {actual}; \
             run `docprobe baseline accept` to record it)"
        ))),
    }
}
