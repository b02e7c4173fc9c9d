//! The submission pipeline: load, gate, decode, evaluate, persist.
//!
//! Client-side condition evaluation is UX only; everything is re-checked
//! here. Validation failures come back as a field-keyed error map and
//! persist nothing. A valid submission persists one entry plus one value
//! per active field in a single transaction.

use serde_json::{Map, Value};
use sqlx::PgPool;

use formhub_core::error::CoreError;
use formhub_core::forms::rules::{ConditionalRule, FieldDef, FieldType, ValidationRules};
use formhub_core::forms::submission::evaluate_submission;
use formhub_core::types::DbId;
use formhub_db::models::entry::{FormEntry, NewEntry};
use formhub_db::models::form::{FormField, FormTree};
use formhub_db::repositories::{EntryRepo, FormRepo};

use crate::error::{AppError, AppResult};

/// Request metadata captured alongside a submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionMeta {
    pub submitter_id: Option<DbId>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Run one public submission end to end.
///
/// `reference` is the form's slug or numeric id. Fails with `NotFound`
/// for a missing form, `Unavailable` for one that is not both active and
/// public, and `ValidationFailure` for bad field values.
pub async fn submit(
    pool: &PgPool,
    reference: &str,
    payload: &Map<String, Value>,
    meta: &SubmissionMeta,
) -> AppResult<FormEntry> {
    let form = FormRepo::find_by_slug_or_id(pool, reference)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Form",
                reference: reference.to_string(),
            })
        })?;

    if !form.is_active || !form.is_public {
        return Err(AppError::Core(CoreError::Unavailable(
            "This form is not accepting submissions".into(),
        )));
    }

    // Load the unfiltered tree: inactive fields are skipped during
    // evaluation but their names stay known, so stale clients that still
    // render a retired field are ignored rather than rejected.
    let form_id = form.id;
    let tree = FormRepo::load_tree(pool, form, false).await?;
    let fields = flatten_fields(&tree)?;

    let values = evaluate_submission(&fields, payload).map_err(AppError::ValidationFailure)?;

    let entry = EntryRepo::create_with_values(
        pool,
        &NewEntry {
            form_id,
            submitter_id: meta.submitter_id,
            ip: meta.ip.clone(),
            meta: serde_json::json!({
                "user_agent": meta.user_agent,
                "referrer": meta.referrer,
            }),
        },
        &values,
    )
    .await?;

    tracing::info!(
        form_id,
        entry_id = entry.id,
        value_count = values.len(),
        "Form submission accepted"
    );
    Ok(entry)
}

/// Flatten the full tree into evaluation-ready field definitions, in
/// (section sort order, field sort order) sequence.
///
/// Each field inherits its section's conditional rule so hiding a
/// section hides every field in it, and its activity flag so a retired
/// section retires every field in it.
pub fn flatten_fields(tree: &FormTree) -> Result<Vec<FieldDef>, AppError> {
    let mut fields = Vec::new();
    for section in &tree.sections {
        let section_conditional = decode_conditional(section.section.conditional.as_ref())?;
        for field in &section.fields {
            let mut def = decode_field(field, section_conditional.clone())?;
            def.is_active = section.section.is_active && field.is_active;
            fields.push(def);
        }
    }
    Ok(fields)
}

/// Decode one stored field row into its typed definition.
///
/// Stored rules are validated at authoring time, so a decode failure here
/// means the stored data was corrupted out of band; it surfaces as an
/// internal error rather than a validation message to the respondent.
pub fn decode_field(
    field: &FormField,
    section_conditional: Option<ConditionalRule>,
) -> Result<FieldDef, AppError> {
    let field_type = parse_field_type(&field.field_type).map_err(internal(field.id, "type"))?;
    let validation = match &field.validation {
        Value::Null => ValidationRules::default(),
        other => serde_json::from_value(other.clone()).map_err(internal(field.id, "validation"))?,
    };
    let conditional = decode_conditional(field.conditional.as_ref())?;
    let options: Vec<String> = match &field.options {
        Some(value) => serde_json::from_value(value.clone()).map_err(internal(field.id, "options"))?,
        None => Vec::new(),
    };

    Ok(FieldDef {
        id: field.id,
        name: field.name.clone(),
        label: field.label.clone(),
        field_type,
        options,
        validation,
        conditional,
        section_conditional,
        is_active: field.is_active,
    })
}

/// Parse the stored `field_type` discriminator.
pub fn parse_field_type(raw: &str) -> Result<FieldType, serde_json::Error> {
    serde_json::from_value(Value::String(raw.to_string()))
}

/// Decode an optional stored conditional rule.
pub fn decode_conditional(raw: Option<&Value>) -> Result<Option<ConditionalRule>, AppError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| {
                AppError::Core(CoreError::Internal(format!(
                    "stored conditional rule failed to decode: {e}"
                )))
            }),
    }
}

fn internal(field_id: DbId, what: &'static str) -> impl FnOnce(serde_json::Error) -> AppError {
    move |e| {
        AppError::Core(CoreError::Internal(format!(
            "stored {what} for field {field_id} failed to decode: {e}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn field_type_parses_known_and_rejects_unknown() {
        assert_eq!(parse_field_type("text").unwrap(), FieldType::Text);
        assert_eq!(parse_field_type("checkbox").unwrap(), FieldType::Checkbox);
        assert!(parse_field_type("hologram").is_err());
    }

    #[test]
    fn conditional_decode() {
        let raw = serde_json::json!({
            "depends_on_field_id": 9,
            "operator": "equals",
            "value": "yes",
            "action": "show",
        });
        let rule = decode_conditional(Some(&raw)).unwrap().unwrap();
        assert_eq!(rule.depends_on_field_id, 9);

        assert!(decode_conditional(None).unwrap().is_none());
        assert!(decode_conditional(Some(&Value::Null)).unwrap().is_none());

        let bad = serde_json::json!({"operator": "equals"});
        assert_matches!(
            decode_conditional(Some(&bad)),
            Err(AppError::Core(CoreError::Internal(_)))
        );
    }
}
