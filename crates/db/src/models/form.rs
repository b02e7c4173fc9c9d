//! Form, section, and field models and DTOs.
//!
//! The `validation`, `conditional`, and `options` columns are jsonb and
//! surface here as raw `serde_json::Value`; they are decoded into the
//! typed rule structs of `formhub_core::forms` at the submission boundary.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use formhub_core::types::{DbId, Timestamp};

/// Distinguishes an absent key from an explicit `null` in update DTOs:
/// absent leaves the column unchanged, `null` clears it.
fn double_option<'de, D>(
    deserializer: D,
) -> Result<Option<Option<serde_json::Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Form {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub settings: serde_json::Value,
    pub is_active: bool,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new form. The slug is derived from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub is_public: Option<bool>,
}

/// DTO for updating a form. All fields optional (merge-patch); the slug
/// is fixed at creation and never regenerated.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub is_public: Option<bool>,
}

/// A row from the `form_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormSection {
    pub id: DbId,
    pub form_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub conditional: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a section. `sort_order` defaults to max+1 within the form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub title: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub conditional: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// DTO for updating a section. All fields optional; sending
/// `"conditional": null` clears the stored rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub conditional: Option<Option<serde_json::Value>>,
    pub is_active: Option<bool>,
}

/// A row from the `form_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormField {
    pub id: DbId,
    pub section_id: DbId,
    pub form_id: DbId,
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub placeholder: Option<String>,
    pub options: Option<serde_json::Value>,
    pub validation: serde_json::Value,
    pub sort_order: i32,
    pub conditional: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a field. `sort_order` defaults to max+1 within the section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateField {
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub placeholder: Option<String>,
    pub options: Option<serde_json::Value>,
    pub validation: Option<serde_json::Value>,
    pub sort_order: Option<i32>,
    pub conditional: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

/// DTO for updating a field. All fields optional; `name` stays unique
/// within the form, and `"conditional": null` clears the stored rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateField {
    pub name: Option<String>,
    pub label: Option<String>,
    pub field_type: Option<String>,
    pub placeholder: Option<String>,
    pub options: Option<serde_json::Value>,
    pub validation: Option<serde_json::Value>,
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub conditional: Option<Option<serde_json::Value>>,
    pub is_active: Option<bool>,
}

/// A form with its full section/field tree, in sort order.
#[derive(Debug, Clone, Serialize)]
pub struct FormTree {
    #[serde(flatten)]
    pub form: Form,
    pub sections: Vec<SectionTree>,
}

/// A section with its fields, in sort order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionTree {
    #[serde(flatten)]
    pub section: FormSection,
    pub fields: Vec<FormField>,
}
