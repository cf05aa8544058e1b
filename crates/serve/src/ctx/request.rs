// crates/serve/src/ctx/request.rs

//! Helpers that read website-level filters from the request.

use super::RequestScope;
use crate::{Error, Result};

/// Reads website tag names from a query parameter.
#[cfg_attr(test, mockall::automock)]
pub trait TagRequestHandler: Send + Sync {
    fn tags(&self, scope: &RequestScope, parameter: &str) -> Vec<String>;
}

/// Reads website category ids from a query parameter.
#[cfg_attr(test, mockall::automock)]
pub trait CategoryRequestHandler: Send + Sync {
    fn categories(&self, scope: &RequestScope, parameter: &str) -> Vec<i64>;
}

/// Audience targeting group of the current visitor.
#[cfg_attr(test, mockall::automock)]
pub trait TargetGroupStore: Send + Sync {
    fn target_group_id(&self) -> Option<i64>;
}

/// Comma separated values, e.g. `?tags=news,sport`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTagRequestHandler;

impl TagRequestHandler for QueryTagRequestHandler {
    fn tags(&self, scope: &RequestScope, parameter: &str) -> Vec<String> {
        split_list(scope.query_param(parameter))
            .map(str::to_string)
            .collect()
    }
}

/// Comma separated ids, e.g. `?categories=1,4`. Non-numeric entries are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCategoryRequestHandler;

impl CategoryRequestHandler for QueryCategoryRequestHandler {
    fn categories(&self, scope: &RequestScope, parameter: &str) -> Vec<i64> {
        split_list(scope.query_param(parameter))
            .filter_map(|v| v.parse().ok())
            .collect()
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Current page from the query parameter `parameter`, defaulting to 1.
///
/// Anything outside `1..=i64::MAX` (or not a number) is out of bounds.
pub fn current_page(scope: &RequestScope, parameter: &str) -> Result<i64> {
    let Some(raw) = scope.query_param(parameter) else {
        return Ok(1);
    };

    let page = raw
        .trim()
        .parse::<i128>()
        .map_err(|_| Error::page_out_of_bounds(raw))?;

    if page < 1 || page > i64::MAX as i128 {
        return Err(Error::page_out_of_bounds(raw));
    }

    Ok(page as i64)
}
