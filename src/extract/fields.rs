//! Typed field reads
//!
//! A `FieldQuery` names a value on a page and says where to read it from.
//! `FieldExtractor` applies the three read policies the metrics page needs:
//! required, optional text, and optional count.

use crate::extract::query::{select_attr, select_text};
use crate::{ExtractError, ExtractResult};
use scraper::Html;

/// Where a field's value lives on a matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// An attribute of the matched element
    Attr(&'static str),
    /// The direct text children of the matched element
    Text,
}

/// A named structural query for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldQuery {
    pub name: &'static str,
    pub css: &'static str,
    pub source: FieldSource,
}

impl FieldQuery {
    /// Query for the `content` of `<meta name="...">`
    pub const fn meta(name: &'static str, css: &'static str) -> Self {
        Self {
            name,
            css,
            source: FieldSource::Attr("content"),
        }
    }

    pub const fn text(name: &'static str, css: &'static str) -> Self {
        Self {
            name,
            css,
            source: FieldSource::Text,
        }
    }

    pub const fn attr(name: &'static str, css: &'static str, attr: &'static str) -> Self {
        Self {
            name,
            css,
            source: FieldSource::Attr(attr),
        }
    }
}

/// Reads typed fields out of one parsed document
pub struct FieldExtractor<'a> {
    document: &'a Html,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self { document }
    }

    /// Every value the query matches, in document order
    pub fn all(&self, query: &FieldQuery) -> ExtractResult<Vec<String>> {
        match query.source {
            FieldSource::Attr(attr) => select_attr(self.document, query.css, attr),
            FieldSource::Text => select_text(self.document, query.css),
        }
    }

    /// First match, or `None` when the query matches nothing
    pub fn first(&self, query: &FieldQuery) -> ExtractResult<Option<String>> {
        Ok(self.all(query)?.into_iter().next())
    }

    /// First match; a missing value aborts the page
    pub fn required(&self, query: &FieldQuery) -> ExtractResult<String> {
        self.first(query)?
            .ok_or(ExtractError::MissingRequiredField { field: query.name })
    }

    /// First match read as a count with thousands separators stripped
    ///
    /// Absent values default to 0. A present value that is not a number is an
    /// error rather than a silent 0.
    pub fn count_or_zero(&self, query: &FieldQuery) -> ExtractResult<u64> {
        match self.first(query)? {
            None => Ok(0),
            Some(raw) => parse_count(query.name, &raw),
        }
    }
}

/// Parses a displayed count such as `"12,345"`
fn parse_count(field: &'static str, raw: &str) -> ExtractResult<u64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<u64>()
        .map_err(|_| ExtractError::MalformedNumber {
            field,
            value: raw.to_string(),
        })
}

/// Replaces every character outside `[A-Za-z0-9]` with a space, one for one
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect()
}
