//! Structural queries
//!
//! Queries are CSS selectors. Attribute reads return the attribute of every
//! matching element; text reads return each direct text child, so markup
//! nested inside a match does not leak into the value.

use crate::{ExtractError, ExtractResult};
use scraper::{Html, Selector};

fn parse_selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidQuery(css.to_string()))
}

/// Returns `attr` of every element matching `css`, in document order
pub fn select_attr(document: &Html, css: &str, attr: &str) -> ExtractResult<Vec<String>> {
    let selector = parse_selector(css)?;

    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect())
}

/// Returns the direct text children of every element matching `css`
pub fn select_text(document: &Html, css: &str) -> ExtractResult<Vec<String>> {
    let selector = parse_selector(css)?;

    Ok(document
        .select(&selector)
        .flat_map(|element| {
            element
                .children()
                .filter_map(|child| child.value().as_text().map(|text| String::from(&**text)))
                .collect::<Vec<_>>()
        })
        .collect())
}
