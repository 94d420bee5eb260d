// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Leaderboard ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{Result, ServiceError};
use crate::model::{RankingQuery, SortColumn};

/// One successful run competing on the leaderboard.
#[derive(Debug, Clone)]
pub(crate) struct RankingEntry {
    pub run_id: String,
    pub group_id: String,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Map<String, Value>,
}

/// Sort entries according to the query.
///
/// Without explicit directives the first schema column is sorted in
/// descending order. Missing or null values always sort last. Ties are
/// broken by finish time, earlier runs first. Unless `include_all` is set,
/// only the best entry of each group is kept.
pub(crate) fn rank(
    columns: &[String],
    mut entries: Vec<RankingEntry>,
    query: &RankingQuery,
) -> Result<Vec<RankingEntry>> {
    let order: Vec<SortColumn> = match &query.order_by {
        Some(order) => {
            if let Some(col) = order.iter().find(|c| !columns.contains(&c.column_id)) {
                return Err(ServiceError::constraint(format!(
                    "unknown column '{}'",
                    col.column_id
                )));
            }
            order.clone()
        }
        None => columns.first().map(SortColumn::desc).into_iter().collect(),
    };

    entries.sort_by(|a, b| {
        for col in &order {
            let ord = compare_values(
                a.results.get(&col.column_id),
                b.results.get(&col.column_id),
                col.sort_desc,
            );
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.finished_at.cmp(&b.finished_at)
    });

    if !query.include_all {
        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.group_id.clone()));
    }
    Ok(entries)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>, desc: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = match (a, b) {
                (Value::Number(x), Value::Number(y)) => {
                    let x = x.as_f64().unwrap_or(f64::NAN);
                    let y = y.as_f64().unwrap_or(f64::NAN);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (x, y) => x.to_string().cmp(&y.to_string()),
            };
            if desc { ord.reverse() } else { ord }
        }
    }
}
