//! Field extraction over parsed pages
//!
//! This module contains the building blocks the stage handlers use:
//! - Structural queries (CSS selectors over `scraper` documents)
//! - Typed field reads with defaults and number normalization
//! - Reduction of ambiguous multi-match counts to one value

mod aggregate;
mod fields;
mod query;

pub use aggregate::{aggregate, aggregate_count, digit_runs};
pub use fields::{sanitize_title, FieldExtractor, FieldQuery, FieldSource};
pub use query::{select_attr, select_text};
