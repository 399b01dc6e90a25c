// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Which rows a page shows, given its dataset, the search box and the search state.

use std::collections::HashSet;

use crate::debounce::SearchState;

/// A dataset row that carries the id its index entry was built from.
pub trait Identified {
    fn document_id(&self) -> &str;
}

impl<T: Identified + ?Sized> Identified for &T {
    fn document_id(&self) -> &str {
        (**self).document_id()
    }
}

impl Identified for String {
    fn document_id(&self) -> &str {
        self
    }
}

impl Identified for str {
    fn document_id(&self) -> &str {
        self
    }
}

impl Identified for serde_json::Value {
    /// Rows fetched as JSON objects carry their id under `"id"`.
    fn document_id(&self) -> &str {
        self.get("id").and_then(serde_json::Value::as_str).unwrap_or("")
    }
}

/// Compute the visible rows. Pure; call again whenever an input changes.
///
/// Precedence:
/// 1. `no_matches` → nothing
/// 2. non-blank query and at least one result id → the dataset rows with
///    those ids, in dataset order (search decides inclusion, not order)
/// 3. otherwise → every row
pub fn reconcile<'a, R: Identified>(dataset: &'a [R], query: &str, state: &SearchState) -> Vec<&'a R> {
    if state.no_matches {
        return Vec::new();
    }

    if !query.trim().is_empty() && !state.search_result_ids.is_empty() {
        let wanted: HashSet<&str> = state
            .search_result_ids
            .iter()
            .map(|id| id.as_str())
            .collect();
        return dataset
            .iter()
            .filter(|row| wanted.contains(row.document_id()))
            .collect();
    }

    dataset.iter().collect()
}
