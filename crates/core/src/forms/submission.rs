//! The pure submission-evaluation pass.
//!
//! Given the form's flattened active fields (section order, then field
//! order) and the raw payload, either produce the full set of values to
//! persist or a field-keyed error map. All failures are collected, never
//! fail-fast, and error order follows the flattened field sequence so
//! output is deterministic and testable.
//!
//! Persistence is the caller's job; this pass never touches I/O.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::condition::resolve_field_state;
use super::rules::{FieldDef, FieldErrors};
use super::validator::{is_blank, stringify, validate_field};
use super::NO_RESPONSE;
use crate::types::DbId;

/// One value ready for storage, in flattened field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub field_id: DbId,
    pub value: String,
}

/// Evaluate one submission payload against a form's fields.
///
/// On success, returns exactly one [`StoredValue`] per active field in
/// `fields`: the validated answer where one was given, the hidden-field
/// answer normalized but unvalidated, or the [`NO_RESPONSE`] sentinel
/// for blanks. Inactive fields get no value and their answers are
/// ignored. Unknown payload keys are rejected explicitly rather than
/// silently dropped; their errors follow the field errors in the map.
pub fn evaluate_submission(
    fields: &[FieldDef],
    payload: &serde_json::Map<String, Value>,
) -> Result<Vec<StoredValue>, FieldErrors> {
    // Answer set for condition evaluation, keyed by field id. Blank
    // answers count as "no answer yet" so dependent rules stay unmatched;
    // retired fields cannot drive conditions.
    let answers: HashMap<DbId, Value> = fields
        .iter()
        .filter(|f| f.is_active)
        .filter_map(|f| {
            payload
                .get(&f.name)
                .filter(|v| !is_blank(v))
                .map(|v| (f.id, v.clone()))
        })
        .collect();

    let mut errors = FieldErrors::new();
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        if !field.is_active {
            continue;
        }
        let state = resolve_field_state(field, &answers);
        let raw = payload.get(&field.name);

        if !state.visible {
            // Hidden fields are never validated. A value submitted for
            // one is still recorded, since the server-side gating may
            // disagree with what the client rendered.
            let value = raw
                .filter(|v| !is_blank(v))
                .map(|v| stringify(v))
                .unwrap_or_else(|| NO_RESPONSE.to_string());
            values.push(StoredValue {
                field_id: field.id,
                value,
            });
            continue;
        }

        match validate_field(field, state.required, raw) {
            Ok(stored) => values.push(StoredValue {
                field_id: field.id,
                value: stored.unwrap_or_else(|| NO_RESPONSE.to_string()),
            }),
            Err(reason) => {
                errors.insert(field.name.clone(), reason);
            }
        }
    }

    // Unknown keys are an explicit error, not a silent drop. The known
    // set includes inactive fields: a stale client submitting a retired
    // field is ignored, not rejected.
    let known: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    for key in payload.keys() {
        if !known.contains(key.as_str()) {
            errors.insert(key.clone(), "unknown field".to_string());
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
