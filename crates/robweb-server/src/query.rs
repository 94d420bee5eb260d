// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Query string parsing.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, RawQuery};
use axum::http::request::Parts;

use robweb_service::{RankingQuery, SortColumn};

use crate::error::{ApiError, Result};

/// Leaderboard sort directives, `column[:asc|:desc],...`.
pub const ORDER_BY: &str = "orderBy";

/// Include all runs instead of the best run per group.
pub const INCLUDE_ALL: &str = "includeAll";

/// User name prefix filter for the user listing.
pub const USER_QUERY: &str = "query";

/// Run state filter for run polling.
pub const RUN_STATE: &str = "state";

/// Decoded query parameters. The first occurrence of a name wins.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self(params)
    }

    /// Value of a parameter; an empty string if given without a value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Leaderboard options from `orderBy` and `includeAll`.
    pub fn ranking_query(&self) -> RankingQuery {
        RankingQuery {
            order_by: self.get(ORDER_BY).and_then(parse_order_by),
            include_all: parse_include_all(self.get(INCLUDE_ALL)),
        }
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let RawQuery(query) = RawQuery::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(query.as_deref().map(QueryParams::parse).unwrap_or_default())
    }
}

/// Parse sort directives.
///
/// Directives are separated by commas; each is a column identifier with an
/// optional `:asc` or `:desc` suffix. Only `asc` (any case) sorts ascending.
/// Empty directives are skipped; `None` if none remain.
pub fn parse_order_by(value: &str) -> Option<Vec<SortColumn>> {
    let columns: Vec<SortColumn> = value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once(':') {
            Some((column, order)) => SortColumn {
                column_id: column.trim().to_string(),
                sort_desc: !order.trim().eq_ignore_ascii_case("asc"),
            },
            None => SortColumn::desc(token),
        })
        .collect();
    if columns.is_empty() { None } else { Some(columns) }
}

/// Interpret the `includeAll` flag.
///
/// Absent is false; given without a value is true; otherwise it is true
/// only for `true` in any case.
pub fn parse_include_all(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => v.is_empty() || v.eq_ignore_ascii_case("true"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_by() {
        let columns = parse_order_by("max_len:asc,max_line:desc,avg_count").unwrap();
        assert_eq!(
            columns,
            vec![
                SortColumn::asc("max_len"),
                SortColumn::desc("max_line"),
                SortColumn::desc("avg_count"),
            ]
        );
    }

    #[test]
    fn test_parse_order_by_suffixes() {
        let columns = parse_order_by("a:ASC,b:whatever,c:").unwrap();
        assert!(!columns[0].sort_desc);
        assert!(columns[1].sort_desc);
        assert!(columns[2].sort_desc);
    }

    #[test]
    fn test_parse_order_by_empty() {
        assert_eq!(parse_order_by(""), None);
        assert_eq!(parse_order_by(" , "), None);
        assert_eq!(parse_order_by("a,,b").unwrap().len(), 2);
    }

    #[test]
    fn test_parse_include_all() {
        assert!(!parse_include_all(None));
        assert!(parse_include_all(Some("")));
        assert!(parse_include_all(Some("true")));
        assert!(parse_include_all(Some("TRUE")));
        assert!(!parse_include_all(Some("false")));
        assert!(!parse_include_all(Some("1")));
    }

    #[test]
    fn test_query_params() {
        let params = QueryParams::parse("includeAll&orderBy=max_len%3Aasc&query=al&query=bo");
        assert_eq!(params.get(INCLUDE_ALL), Some(""));
        assert_eq!(params.get(USER_QUERY), Some("al"));
        let query = params.ranking_query();
        assert!(query.include_all);
        assert_eq!(query.order_by, Some(vec![SortColumn::asc("max_len")]));

        let query = QueryParams::default().ranking_query();
        assert_eq!(query, RankingQuery::default());
    }
}
