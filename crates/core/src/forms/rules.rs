//! Typed form rules: field types, validation constraints, and
//! conditional-display rules.
//!
//! These structs are the decoded form of the jsonb `validation` and
//! `conditional` columns on `form_fields` / `form_sections`. Decoding
//! happens at the storage boundary so the evaluator and validator only
//! ever see well-typed rules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// The input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    File,
}

impl FieldType {
    /// Whether this type selects from a fixed option list.
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }

    /// Whether this type accepts multiple selections.
    pub fn is_multi_select(self) -> bool {
        matches!(self, FieldType::Checkbox)
    }
}

/// Validation constraints declared on a field.
///
/// All constraints are optional; `required` defaults to false. For
/// checkbox fields, `min_length`/`max_length` bound the selection count
/// rather than string length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub pattern: Option<String>,
}

/// Comparison operator of a conditional rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    /// Array membership for multi-selects, substring for text answers.
    Contains,
    GreaterThan,
    LessThan,
}

/// What a matched conditional rule does to its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionAction {
    /// Visible only while the rule matches.
    Show,
    /// Hidden while the rule matches.
    Hide,
    /// Required while the rule matches (visibility unchanged).
    Require,
    /// Not required while the rule matches, overriding the declared flag.
    Optional,
}

/// A conditional-display rule on a field or section, dependent on the
/// current answer to another field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub depends_on_field_id: DbId,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
    pub action: ConditionAction,
}

/// A field definition flattened out of its section, ready for condition
/// evaluation and validation.
///
/// `section_conditional` carries the owning section's rule so hiding a
/// section hides every field in it. `is_active` is false for retired
/// fields (or fields in retired sections): they take no part in
/// evaluation but keep their name known, so a stale client submitting
/// one is not told the field is unknown.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub id: DbId,
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub options: Vec<String>,
    pub validation: ValidationRules,
    pub conditional: Option<ConditionalRule>,
    pub section_conditional: Option<ConditionalRule>,
    pub is_active: bool,
}

impl FieldDef {
    /// A minimal field definition; tests and builders fill in the rest.
    pub fn new(id: DbId, name: &str, field_type: FieldType) -> Self {
        Self {
            id,
            name: name.to_string(),
            label: name.to_string(),
            field_type,
            options: Vec::new(),
            validation: ValidationRules::default(),
            conditional: None,
            section_conditional: None,
            is_active: true,
        }
    }
}

/// Field-name-keyed validation failures, in flattened field order.
///
/// `IndexMap` preserves insertion order so clients and tests see errors
/// in the same sequence the form renders its fields.
pub type FieldErrors = IndexMap<String, String>;
