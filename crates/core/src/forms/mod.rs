//! The form engine: rule types, conditional-visibility evaluation,
//! per-field validation, and the pure submission-evaluation pass.
//!
//! Everything here is synchronous, CPU-only logic with no database
//! dependencies. The api crate feeds it field definitions decoded from
//! stored rows and raw submission payloads.

pub mod condition;
pub mod rules;
pub mod submission;
pub mod validator;

pub use rules::{
    ConditionAction, ConditionOperator, ConditionalRule, FieldDef, FieldErrors, FieldType,
    ValidationRules,
};

/// Sentinel stored for an active field the respondent left blank.
///
/// Every successful entry records one value per active field, answered or
/// not, so entries export as fixed-width rows across the form's lifetime.
pub const NO_RESPONSE: &str = "No response";
