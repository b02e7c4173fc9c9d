//! Integration tests for the form authoring repositories.
//!
//! Exercises the repository layer against a real database:
//! - Slug generation and collision suffixes
//! - Field-name uniqueness within a form
//! - Tree round-trips in sort order
//! - Merge-patch updates
//! - Explicit cascade deletes (section -> fields, form -> everything)

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;

use formhub_db::models::entry::NewEntry;
use formhub_db::models::form::{
    CreateField, CreateForm, CreateSection, UpdateField, UpdateForm, UpdateSection,
};
use formhub_db::repositories::{EntryRepo, FieldRepo, FormRepo, SectionRepo};
use formhub_core::forms::submission::StoredValue;

const OWNER: i64 = 7;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_form(title: &str) -> CreateForm {
    CreateForm {
        title: title.to_string(),
        description: None,
        settings: None,
        is_active: None,
        is_public: None,
    }
}

fn new_section(title: &str) -> CreateSection {
    CreateSection {
        title: title.to_string(),
        description: None,
        sort_order: None,
        conditional: None,
        is_active: None,
    }
}

fn new_field(name: &str, field_type: &str) -> CreateField {
    CreateField {
        name: name.to_string(),
        label: name.to_string(),
        field_type: field_type.to_string(),
        placeholder: None,
        options: None,
        validation: None,
        sort_order: None,
        conditional: None,
        is_active: None,
    }
}

// ---------------------------------------------------------------------------
// Slug generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_slug_collision_suffixes(pool: PgPool) {
    let first = FormRepo::create(&pool, OWNER, &new_form("My Form")).await.unwrap();
    let second = FormRepo::create(&pool, OWNER, &new_form("My Form")).await.unwrap();
    let third = FormRepo::create(&pool, OWNER, &new_form("My Form")).await.unwrap();

    assert_eq!(first.slug, "my-form");
    assert_eq!(second.slug, "my-form-1");
    assert_eq!(third.slug, "my-form-2");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_slug_from_messy_title(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("  Community Survey: 2026!  "))
        .await
        .unwrap();
    assert_eq!(form.slug, "community-survey-2026");

    let found = FormRepo::find_by_slug(&pool, "community-survey-2026")
        .await
        .unwrap()
        .expect("form should be findable by slug");
    assert_eq!(found.id, form.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_by_slug_or_id(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Jobs Board Intake")).await.unwrap();

    let by_slug = FormRepo::find_by_slug_or_id(&pool, "jobs-board-intake").await.unwrap();
    assert_eq!(by_slug.unwrap().id, form.id);

    let by_id = FormRepo::find_by_slug_or_id(&pool, &form.id.to_string()).await.unwrap();
    assert_eq!(by_id.unwrap().id, form.id);

    let missing = FormRepo::find_by_slug_or_id(&pool, "does-not-exist").await.unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Field name uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_field_name_unique_within_form(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Survey")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("Basics")).await.unwrap();

    FieldRepo::create(&pool, section.id, form.id, &new_field("email", "email"))
        .await
        .unwrap();

    assert!(FieldRepo::name_taken(&pool, form.id, "email", None).await.unwrap());

    // The unique index backstops a direct duplicate insert.
    let duplicate =
        FieldRepo::create(&pool, section.id, form.id, &new_field("email", "text")).await;
    assert!(duplicate.is_err());

    // The same name in a different form is fine.
    let other = FormRepo::create(&pool, OWNER, &new_form("Other Survey")).await.unwrap();
    let other_section = SectionRepo::create(&pool, other.id, &new_section("Basics")).await.unwrap();
    FieldRepo::create(&pool, other_section.id, other.id, &new_field("email", "email"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_name_taken_excludes_self_on_rename(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Survey")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("Basics")).await.unwrap();
    let field = FieldRepo::create(&pool, section.id, form.id, &new_field("email", "email"))
        .await
        .unwrap();

    // Renaming a field to its current name is not a conflict.
    assert!(!FieldRepo::name_taken(&pool, form.id, "email", Some(field.id)).await.unwrap());
}

// ---------------------------------------------------------------------------
// Tree round-trip and ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_tree_round_trip_in_sort_order(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Registration")).await.unwrap();

    let s1 = SectionRepo::create(&pool, form.id, &new_section("Personal")).await.unwrap();
    let f1 = FieldRepo::create(&pool, s1.id, form.id, &new_field("name", "text")).await.unwrap();

    let tree = FormRepo::load_tree(&pool, form.clone(), false).await.unwrap();
    assert_eq!(tree.sections.len(), 1);
    assert_eq!(tree.sections[0].fields.len(), 1);
    assert_eq!(tree.sections[0].fields[0].id, f1.id);

    // Add one more section and field; the re-fetched tree reflects
    // exactly the added nodes in their sort order.
    let s2 = SectionRepo::create(&pool, form.id, &new_section("Contact")).await.unwrap();
    let f2 = FieldRepo::create(&pool, s2.id, form.id, &new_field("email", "email")).await.unwrap();

    assert_eq!(s1.sort_order, 1);
    assert_eq!(s2.sort_order, 2);

    let tree = FormRepo::load_tree(&pool, form, false).await.unwrap();
    assert_eq!(tree.sections.len(), 2);
    assert_eq!(tree.sections[0].section.id, s1.id);
    assert_eq!(tree.sections[1].section.id, s2.id);
    assert_eq!(tree.sections[1].fields[0].id, f2.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_explicit_sort_order_wins(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Ordered")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("Only")).await.unwrap();

    let mut last = new_field("last", "text");
    last.sort_order = Some(50);
    let mut first = new_field("first", "text");
    first.sort_order = Some(10);

    let last = FieldRepo::create(&pool, section.id, form.id, &last).await.unwrap();
    let first = FieldRepo::create(&pool, section.id, form.id, &first).await.unwrap();

    let tree = FormRepo::load_tree(&pool, form, false).await.unwrap();
    let ids: Vec<i64> = tree.sections[0].fields.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![first.id, last.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_load_tree_filters_inactive_on_public_path(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Filtered")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("Visible")).await.unwrap();
    FieldRepo::create(&pool, section.id, form.id, &new_field("kept", "text")).await.unwrap();

    let mut inactive = new_field("dropped", "text");
    inactive.is_active = Some(false);
    FieldRepo::create(&pool, section.id, form.id, &inactive).await.unwrap();

    let public = FormRepo::load_tree(&pool, form.clone(), true).await.unwrap();
    assert_eq!(public.sections[0].fields.len(), 1);
    assert_eq!(public.sections[0].fields[0].name, "kept");

    // The owner path sees everything.
    let owner = FormRepo::load_tree(&pool, form, false).await.unwrap();
    assert_eq!(owner.sections[0].fields.len(), 2);
}

// ---------------------------------------------------------------------------
// Merge-patch updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_form_is_merge_patch(pool: PgPool) {
    let mut input = new_form("Original");
    input.description = Some("keep me".to_string());
    let form = FormRepo::create(&pool, OWNER, &input).await.unwrap();

    let updated = FormRepo::update(
        &pool,
        form.id,
        &UpdateForm {
            title: Some("Renamed".to_string()),
            description: None,
            settings: None,
            is_active: None,
            is_public: Some(true),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.description.as_deref(), Some("keep me"));
    assert!(updated.is_public);
    // The slug never changes after creation.
    assert_eq!(updated.slug, "original");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_explicit_null_clears_conditional(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Gated")).await.unwrap();

    let rule = json!({
        "depends_on_field_id": 1,
        "operator": "equals",
        "value": "yes",
        "action": "show",
    });

    let mut section_input = new_section("Travel");
    section_input.conditional = Some(rule.clone());
    let section = SectionRepo::create(&pool, form.id, &section_input).await.unwrap();
    assert!(section.conditional.is_some());

    let mut field_input = new_field("passport", "text");
    field_input.conditional = Some(rule);
    let field = FieldRepo::create(&pool, section.id, form.id, &field_input).await.unwrap();
    assert!(field.conditional.is_some());

    // Omitting the key leaves the rule in place.
    let updated = FieldRepo::update(
        &pool,
        field.id,
        &UpdateField {
            label: Some("Passport number".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(updated.conditional.is_some());

    // An explicit null clears it, for fields and sections alike.
    let cleared = FieldRepo::update(
        &pool,
        field.id,
        &UpdateField {
            conditional: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(cleared.conditional.is_none());

    let cleared = SectionRepo::update(
        &pool,
        section.id,
        &UpdateSection {
            conditional: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(cleared.conditional.is_none());
}

#[test]
fn test_update_field_distinguishes_absent_from_null() {
    let absent: UpdateField = serde_json::from_str(r#"{"label": "x"}"#).unwrap();
    assert_matches!(absent.conditional, None);

    let null: UpdateField = serde_json::from_str(r#"{"conditional": null}"#).unwrap();
    assert_matches!(null.conditional, Some(None));

    let set: UpdateField = serde_json::from_str(
        r#"{"conditional": {"depends_on_field_id": 1, "operator": "equals",
            "value": "yes", "action": "show"}}"#,
    )
    .unwrap();
    assert_matches!(set.conditional, Some(Some(_)));
}

// ---------------------------------------------------------------------------
// Cascade deletes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_section_cascades_to_fields(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Doomed Section")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("Gone")).await.unwrap();
    let field = FieldRepo::create(&pool, section.id, form.id, &new_field("f", "text"))
        .await
        .unwrap();

    assert!(SectionRepo::delete(&pool, section.id).await.unwrap());
    assert!(SectionRepo::find_by_id(&pool, section.id).await.unwrap().is_none());
    assert!(FieldRepo::find_by_id(&pool, field.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_form_cascades_entire_subtree(pool: PgPool) {
    let form = FormRepo::create(&pool, OWNER, &new_form("Doomed Form")).await.unwrap();
    let section = SectionRepo::create(&pool, form.id, &new_section("S")).await.unwrap();
    let field = FieldRepo::create(&pool, section.id, form.id, &new_field("f", "text"))
        .await
        .unwrap();

    EntryRepo::create_with_values(
        &pool,
        &NewEntry {
            form_id: form.id,
            submitter_id: None,
            ip: None,
            meta: json!({}),
        },
        &[StoredValue {
            field_id: field.id,
            value: "hello".to_string(),
        }],
    )
    .await
    .unwrap();

    assert!(FormRepo::delete(&pool, form.id).await.unwrap());

    assert!(FormRepo::find_by_id(&pool, form.id).await.unwrap().is_none());
    assert!(SectionRepo::find_by_id(&pool, section.id).await.unwrap().is_none());
    assert!(FieldRepo::find_by_id(&pool, field.id).await.unwrap().is_none());
    assert_eq!(EntryRepo::count_entries(&pool, form.id).await.unwrap(), 0);
    assert_eq!(EntryRepo::count_values(&pool, form.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_form_reports_false(pool: PgPool) {
    assert!(!FormRepo::delete(&pool, 999_999).await.unwrap());
}
