//! Dataset rows → index documents.
//!
//! Rows are arbitrary JSON objects as the portal's API serves them. Only the
//! id field and the configured text fields matter; everything else is
//! ignored.

use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, SearchError};
use crate::types::{DocField, SearchDoc};

use super::DomainDefinition;

/// Read a domain's dataset file and extract its documents, in file order.
///
/// Fails on unreadable files, non-array JSON, rows without a usable id, and
/// duplicate ids.
pub fn load_domain_documents(input_dir: &Path, def: &DomainDefinition) -> Result<Vec<SearchDoc>> {
    let path = input_dir.join(&def.documents);
    let content = fs::read_to_string(&path).map_err(|e| {
        SearchError::InvalidInput(format!("cannot read {}: {}", path.display(), e))
    })?;
    let rows: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
        SearchError::InvalidInput(format!("{} is not a JSON array of rows: {}", path.display(), e))
    })?;

    #[cfg(feature = "parallel")]
    let docs: Vec<SearchDoc> = rows
        .par_iter()
        .enumerate()
        .map(|(position, row)| extract_document(row, def, position))
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let docs: Vec<SearchDoc> = rows
        .iter()
        .enumerate()
        .map(|(position, row)| extract_document(row, def, position))
        .collect::<Result<_>>()?;

    check_unique_ids(&docs, &def.documents)?;
    Ok(docs)
}

/// Build one index document from one row.
pub fn extract_document(row: &Value, def: &DomainDefinition, position: usize) -> Result<SearchDoc> {
    let id = match row.get(&def.id_field) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(SearchError::InvalidInput(format!(
                "row {} of {} has no usable `{}`",
                position, def.documents, def.id_field
            )))
        }
    };

    let mut doc = SearchDoc::new(id);
    for field in &def.fields {
        let Some(value) = row.get(&field.name) else {
            continue;
        };
        for text in field_texts(value) {
            doc.fields.push(DocField {
                field_type: field.field_type,
                text,
            });
        }
    }
    Ok(doc)
}

/// Text values of one field: a string, a number, or an array of those.
/// Nulls, booleans and nested objects contribute nothing.
fn field_texts(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn check_unique_ids(docs: &[SearchDoc], file: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(docs.len());
    for doc in docs {
        if !seen.insert(doc.id.as_str()) {
            return Err(SearchError::InvalidInput(format!(
                "duplicate id `{}` in {}",
                doc.id, file
            )));
        }
    }
    Ok(())
}
