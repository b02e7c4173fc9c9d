//! Per-field validation. Pure logic, no database access.
//!
//! One call validates one raw answer against one field definition and, on
//! success, yields the normalized string to persist. Failure reasons are
//! short human-readable phrases keyed by field name in the aggregated
//! error map; the `required` reason is the literal `"required"`.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::rules::{FieldDef, FieldType};

/// Validate one raw answer against its field definition.
///
/// `required` is the *resolved* flag from the condition evaluator, not the
/// declared one. Returns:
///
/// - `Ok(Some(normalized))`: valid answer, store this string;
/// - `Ok(None)`: blank and not required, store the sentinel;
/// - `Err(reason)`: constraint violated.
pub fn validate_field(
    field: &FieldDef,
    required: bool,
    raw: Option<&Value>,
) -> Result<Option<String>, String> {
    let Some(value) = raw.filter(|v| !is_blank(v)) else {
        if required {
            return Err("required".to_string());
        }
        return Ok(None);
    };

    match field.field_type {
        FieldType::Text | FieldType::Textarea => validate_text(field, value),
        FieldType::Email => validate_email(value),
        FieldType::Phone => validate_phone(value),
        FieldType::Number => validate_number(field, value),
        FieldType::Select | FieldType::Radio => validate_choice(field, value),
        FieldType::Checkbox => validate_multi_choice(field, value),
        FieldType::Date => validate_date(value),
        FieldType::File => validate_file(value),
    }
    .map(Some)
}

/// Blank answers: missing, null, empty/whitespace string, empty array.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Normalize an answer for storage without validating it.
///
/// Used for values submitted against hidden fields, which are persisted
/// as-is but never validated. Arrays and objects are JSON-encoded.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn validate_text(field: &FieldDef, value: &Value) -> Result<String, String> {
    let Some(s) = value.as_str() else {
        return Err("must be text".to_string());
    };
    let s = s.trim();

    if let Some(min) = field.validation.min_length {
        if s.chars().count() < min {
            return Err(format!("must be at least {min} characters"));
        }
    }
    if let Some(max) = field.validation.max_length {
        if s.chars().count() > max {
            return Err(format!("must be at most {max} characters"));
        }
    }
    if let Some(pattern) = &field.validation.pattern {
        // A malformed stored pattern is an authoring bug; it must not
        // block respondents, so it is skipped rather than failed.
        if let Ok(re) = Regex::new(pattern) {
            if !re.is_match(s) {
                return Err("does not match the required format".to_string());
            }
        }
    }

    Ok(s.to_string())
}

fn validate_email(value: &Value) -> Result<String, String> {
    let s = value.as_str().map(str::trim).unwrap_or_default();
    let well_formed = matches!(s.split('@').collect::<Vec<_>>().as_slice(),
        [local, domain] if !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !s.contains(char::is_whitespace));
    if well_formed {
        Ok(s.to_string())
    } else {
        Err("must be a valid email address".to_string())
    }
}

fn validate_phone(value: &Value) -> Result<String, String> {
    let s = value.as_str().map(str::trim).unwrap_or_default();
    let digits = s.chars().filter(char::is_ascii_digit).count();
    let allowed = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if allowed && (7..=15).contains(&digits) {
        Ok(s.to_string())
    } else {
        Err("must be a valid phone number".to_string())
    }
}

fn validate_number(field: &FieldDef, value: &Value) -> Result<String, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(n) = parsed else {
        return Err("must be a number".to_string());
    };

    if let Some(min) = field.validation.min_value {
        if n < min {
            return Err(format!("must be at least {min}"));
        }
    }
    if let Some(max) = field.validation.max_value {
        if n > max {
            return Err(format!("must be at most {max}"));
        }
    }

    Ok(stringify(value))
}

fn validate_choice(field: &FieldDef, value: &Value) -> Result<String, String> {
    let Some(s) = value.as_str() else {
        return Err("must be one of the allowed options".to_string());
    };
    if field.options.iter().any(|opt| opt == s) {
        Ok(s.to_string())
    } else {
        Err("must be one of the allowed options".to_string())
    }
}

fn validate_multi_choice(field: &FieldDef, value: &Value) -> Result<String, String> {
    // A bare string counts as a single selection.
    let selections: Vec<&str> = match value {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().ok_or(()))
            .collect::<Result<_, _>>()
            .map_err(|()| "must be a list of options".to_string())?,
        Value::String(s) => vec![s.as_str()],
        _ => return Err("must be a list of options".to_string()),
    };

    if let Some(sel) = selections
        .iter()
        .find(|sel| !field.options.iter().any(|opt| opt == *sel))
    {
        return Err(format!("'{sel}' is not one of the allowed options"));
    }

    // For multi-selects, min/max length bound the selection count.
    if let Some(min) = field.validation.min_length {
        if selections.len() < min {
            return Err(format!("select at least {min} options"));
        }
    }
    if let Some(max) = field.validation.max_length {
        if selections.len() > max {
            return Err(format!("select at most {max} options"));
        }
    }

    serde_json::to_string(&selections).map_err(|e| e.to_string())
}

fn validate_date(value: &Value) -> Result<String, String> {
    let s = value.as_str().map(str::trim).unwrap_or_default();
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(_) => Ok(s.to_string()),
        Err(_) => Err("must be a valid date (YYYY-MM-DD)".to_string()),
    }
}

/// File answers arrive as upload descriptors, not bytes: `{name, size, type}`.
fn validate_file(value: &Value) -> Result<String, String> {
    let valid = value
        .as_object()
        .is_some_and(|obj| obj.get("name").and_then(Value::as_str).is_some());
    if valid {
        Ok(value.to_string())
    } else {
        Err("must be a file upload".to_string())
    }
}
