//! Conditional-visibility evaluator. Pure logic, no database access.
//!
//! The server-side evaluation here is authoritative; client-side
//! re-evaluation exists only for UX and is never trusted.

use std::collections::HashMap;

use serde_json::Value;

use super::rules::{ConditionAction, ConditionalRule, FieldDef};
use crate::types::DbId;

/// Resolved display state of one field within one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub visible: bool,
    pub required: bool,
}

/// Decide whether a conditional rule currently matches.
///
/// When the depended-on field has no recorded answer the rule is
/// unmatched. This is the safe default: a `show`-gated node stays hidden
/// and a `require`-gated node stays optional until the dependency is
/// answered.
pub fn rule_matches(rule: &ConditionalRule, answers: &HashMap<DbId, Value>) -> bool {
    let Some(answer) = answers.get(&rule.depends_on_field_id) else {
        return false;
    };

    use super::rules::ConditionOperator::*;
    match rule.operator {
        Equals => values_equal(answer, &rule.value),
        NotEquals => !values_equal(answer, &rule.value),
        Contains => answer_contains(answer, &rule.value),
        GreaterThan => match (as_number(answer), as_number(&rule.value)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        LessThan => match (as_number(answer), as_number(&rule.value)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

/// Resolve a field's visibility and required-ness against the answer set.
///
/// The owning section's rule is applied first: a hidden section hides all
/// of its fields. `Require`/`Optional` on a section do not affect
/// visibility and carry no per-field meaning, so they are ignored here.
pub fn resolve_field_state(field: &FieldDef, answers: &HashMap<DbId, Value>) -> FieldState {
    let mut visible = match &field.section_conditional {
        Some(rule) => match rule.action {
            ConditionAction::Show => rule_matches(rule, answers),
            ConditionAction::Hide => !rule_matches(rule, answers),
            ConditionAction::Require | ConditionAction::Optional => true,
        },
        None => true,
    };

    let mut required = field.validation.required;

    if let Some(rule) = &field.conditional {
        let matched = rule_matches(rule, answers);
        match rule.action {
            ConditionAction::Show => visible = visible && matched,
            ConditionAction::Hide => visible = visible && !matched,
            ConditionAction::Require => {
                if matched {
                    required = true;
                }
            }
            ConditionAction::Optional => {
                if matched {
                    required = false;
                }
            }
        }
    }

    // Hidden fields are never required, whatever their declared rule says.
    if !visible {
        required = false;
    }

    FieldState { visible, required }
}

/// Scalar-tolerant equality: `"5"` and `5` compare equal, arrays and
/// objects compare structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (scalar_string(a), scalar_string(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Membership for array answers, substring for string answers.
fn answer_contains(answer: &Value, needle: &Value) -> bool {
    match answer {
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        _ => false,
    }
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::rules::{ConditionOperator, FieldType, ValidationRules};
    use serde_json::json;

    fn rule(op: ConditionOperator, value: Value, action: ConditionAction) -> ConditionalRule {
        ConditionalRule {
            depends_on_field_id: 1,
            operator: op,
            value,
            action,
        }
    }

    fn answers(value: Value) -> HashMap<DbId, Value> {
        HashMap::from([(1, value)])
    }

    #[test]
    fn equals_matches_same_string() {
        let r = rule(ConditionOperator::Equals, json!("yes"), ConditionAction::Show);
        assert!(rule_matches(&r, &answers(json!("yes"))));
        assert!(!rule_matches(&r, &answers(json!("no"))));
    }

    #[test]
    fn equals_is_scalar_tolerant() {
        let r = rule(ConditionOperator::Equals, json!("5"), ConditionAction::Show);
        assert!(rule_matches(&r, &answers(json!(5))));
    }

    #[test]
    fn not_equals() {
        let r = rule(ConditionOperator::NotEquals, json!("yes"), ConditionAction::Show);
        assert!(rule_matches(&r, &answers(json!("no"))));
        assert!(!rule_matches(&r, &answers(json!("yes"))));
    }

    #[test]
    fn contains_on_multi_select() {
        let r = rule(ConditionOperator::Contains, json!("RW"), ConditionAction::Show);
        assert!(rule_matches(&r, &answers(json!(["KE", "RW"]))));
        assert!(!rule_matches(&r, &answers(json!(["KE", "UG"]))));
    }

    #[test]
    fn contains_on_string_is_substring() {
        let r = rule(ConditionOperator::Contains, json!("bridge"), ConditionAction::Show);
        assert!(rule_matches(&r, &answers(json!("footbridge repair"))));
        assert!(!rule_matches(&r, &answers(json!("road repair"))));
    }

    #[test]
    fn numeric_comparisons() {
        let gt = rule(ConditionOperator::GreaterThan, json!(18), ConditionAction::Show);
        assert!(rule_matches(&gt, &answers(json!(21))));
        assert!(rule_matches(&gt, &answers(json!("21"))));
        assert!(!rule_matches(&gt, &answers(json!(18))));

        let lt = rule(ConditionOperator::LessThan, json!(18), ConditionAction::Show);
        assert!(rule_matches(&lt, &answers(json!(17))));
        assert!(!rule_matches(&lt, &answers(json!("not a number"))));
    }

    #[test]
    fn missing_answer_is_unmatched() {
        let r = rule(ConditionOperator::Equals, json!("yes"), ConditionAction::Show);
        assert!(!rule_matches(&r, &HashMap::new()));

        let r = rule(ConditionOperator::NotEquals, json!("yes"), ConditionAction::Show);
        assert!(!rule_matches(&r, &HashMap::new()));
    }

    #[test]
    fn show_action_gates_visibility() {
        let mut field = FieldDef::new(2, "details", FieldType::Text);
        field.conditional = Some(rule(
            ConditionOperator::Equals,
            json!("yes"),
            ConditionAction::Show,
        ));

        let shown = resolve_field_state(&field, &answers(json!("yes")));
        assert!(shown.visible);

        let hidden = resolve_field_state(&field, &answers(json!("no")));
        assert!(!hidden.visible);

        // No answer yet: hidden by default.
        let default = resolve_field_state(&field, &HashMap::new());
        assert!(!default.visible);
    }

    #[test]
    fn hide_action_inverts() {
        let mut field = FieldDef::new(2, "details", FieldType::Text);
        field.conditional = Some(rule(
            ConditionOperator::Equals,
            json!("yes"),
            ConditionAction::Hide,
        ));

        assert!(!resolve_field_state(&field, &answers(json!("yes"))).visible);
        assert!(resolve_field_state(&field, &answers(json!("no"))).visible);
        // No answer: not matched, so not hidden.
        assert!(resolve_field_state(&field, &HashMap::new()).visible);
    }

    #[test]
    fn require_action_sets_required_only_when_matched() {
        let mut field = FieldDef::new(2, "reason", FieldType::Text);
        field.conditional = Some(rule(
            ConditionOperator::Equals,
            json!("yes"),
            ConditionAction::Require,
        ));

        let matched = resolve_field_state(&field, &answers(json!("yes")));
        assert!(matched.required);

        let unmatched = resolve_field_state(&field, &answers(json!("no")));
        assert!(!unmatched.required);
    }

    #[test]
    fn optional_action_waives_declared_required() {
        let mut field = FieldDef::new(2, "id_number", FieldType::Text);
        field.validation = ValidationRules {
            required: true,
            ..Default::default()
        };
        field.conditional = Some(rule(
            ConditionOperator::Equals,
            json!("minor"),
            ConditionAction::Optional,
        ));

        assert!(!resolve_field_state(&field, &answers(json!("minor"))).required);
        assert!(resolve_field_state(&field, &answers(json!("adult"))).required);
    }

    #[test]
    fn hidden_field_is_never_required() {
        let mut field = FieldDef::new(2, "details", FieldType::Text);
        field.validation = ValidationRules {
            required: true,
            ..Default::default()
        };
        field.conditional = Some(rule(
            ConditionOperator::Equals,
            json!("yes"),
            ConditionAction::Show,
        ));

        let state = resolve_field_state(&field, &answers(json!("no")));
        assert!(!state.visible);
        assert!(!state.required);
    }

    #[test]
    fn hidden_section_hides_its_fields() {
        let mut field = FieldDef::new(2, "street", FieldType::Text);
        field.section_conditional = Some(rule(
            ConditionOperator::Equals,
            json!("yes"),
            ConditionAction::Show,
        ));

        assert!(resolve_field_state(&field, &answers(json!("yes"))).visible);
        assert!(!resolve_field_state(&field, &answers(json!("no"))).visible);
    }
}
