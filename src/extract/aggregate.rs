//! Reduction of ambiguous numeric matches
//!
//! A metrics page may render several badges for one figure. Each matched
//! string contributes the first digit run the pattern finds; the collected
//! runs are reduced to a single maximum.

use crate::config::AggregationMode;
use crate::{ExtractError, ExtractResult};
use regex::Regex;
use std::cmp::Ordering;

/// Pulls the first pattern match out of each candidate string
///
/// If the pattern has a capture group the first group is taken, otherwise
/// the whole match. Candidates without a match contribute nothing.
pub fn digit_runs<'a, I>(candidates: I, pattern: &Regex) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let captures = pattern.captures(candidate)?;
            captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Selects the maximum digit run; an empty set yields `"0"`
pub fn aggregate(runs: &[String], mode: AggregationMode) -> String {
    let max = match mode {
        AggregationMode::Lexicographic => runs.iter().max(),
        AggregationMode::Numeric => runs.iter().max_by(|a, b| compare_numeric(a, b)),
    };

    max.cloned().unwrap_or_else(|| "0".to_string())
}

/// Aggregates and parses the result as a count
pub fn aggregate_count(
    field: &'static str,
    runs: &[String],
    mode: AggregationMode,
) -> ExtractResult<u64> {
    let value = aggregate(runs, mode);
    value
        .parse::<u64>()
        .map_err(|_| ExtractError::MalformedNumber { field, value })
}

/// Orders ASCII digit strings by value without parsing them
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
