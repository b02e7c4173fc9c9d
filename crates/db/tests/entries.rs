//! Integration tests for entry/value persistence.
//!
//! Entries are insert-only historical records: created atomically with
//! their values, never mutated, and untouched by later edits to the
//! form definition tree.

use serde_json::json;
use sqlx::PgPool;

use formhub_core::forms::submission::StoredValue;
use formhub_db::models::entry::NewEntry;
use formhub_db::models::form::{CreateField, CreateForm, CreateSection};
use formhub_db::repositories::{EntryRepo, FieldRepo, FormRepo, SectionRepo};

const OWNER: i64 = 3;

async fn seed_form(pool: &PgPool) -> (i64, i64, i64) {
    let form = FormRepo::create(
        pool,
        OWNER,
        &CreateForm {
            title: "Feedback".to_string(),
            description: None,
            settings: None,
            is_active: None,
            is_public: Some(true),
        },
    )
    .await
    .unwrap();

    let section = SectionRepo::create(
        pool,
        form.id,
        &CreateSection {
            title: "Main".to_string(),
            description: None,
            sort_order: None,
            conditional: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    let field = FieldRepo::create(
        pool,
        section.id,
        form.id,
        &CreateField {
            name: "comment".to_string(),
            label: "Comment".to_string(),
            field_type: "textarea".to_string(),
            placeholder: None,
            options: None,
            validation: None,
            sort_order: None,
            conditional: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    (form.id, section.id, field.id)
}

fn new_entry(form_id: i64) -> NewEntry {
    NewEntry {
        form_id,
        submitter_id: None,
        ip: Some("203.0.113.9".to_string()),
        meta: json!({"user_agent": "test-suite"}),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_entry_and_values_created_together(pool: PgPool) {
    let (form_id, _, field_id) = seed_form(&pool).await;

    let entry = EntryRepo::create_with_values(
        &pool,
        &new_entry(form_id),
        &[StoredValue {
            field_id,
            value: "great event".to_string(),
        }],
    )
    .await
    .unwrap();

    let found = EntryRepo::find_by_id(&pool, entry.id).await.unwrap().unwrap();
    assert_eq!(found.entry.form_id, form_id);
    assert_eq!(found.entry.ip.as_deref(), Some("203.0.113.9"));
    assert_eq!(found.values.len(), 1);
    assert_eq!(found.values[0].field_id, field_id);
    assert_eq!(found.values[0].value, "great event");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_anonymous_submitter_allowed(pool: PgPool) {
    let (form_id, _, field_id) = seed_form(&pool).await;

    let entry = EntryRepo::create_with_values(
        &pool,
        &NewEntry {
            form_id,
            submitter_id: None,
            ip: None,
            meta: json!({}),
        },
        &[StoredValue {
            field_id,
            value: "anon".to_string(),
        }],
    )
    .await
    .unwrap();

    assert!(entry.submitter_id.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_values_survive_field_deletion(pool: PgPool) {
    let (form_id, _, field_id) = seed_form(&pool).await;

    let entry = EntryRepo::create_with_values(
        &pool,
        &new_entry(form_id),
        &[StoredValue {
            field_id,
            value: "historical".to_string(),
        }],
    )
    .await
    .unwrap();

    assert!(FieldRepo::delete(&pool, field_id).await.unwrap());

    let found = EntryRepo::find_by_id(&pool, entry.id).await.unwrap().unwrap();
    assert_eq!(found.values.len(), 1);
    assert_eq!(found.values[0].value, "historical");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_by_form_newest_first(pool: PgPool) {
    let (form_id, _, field_id) = seed_form(&pool).await;

    let first = EntryRepo::create_with_values(
        &pool,
        &new_entry(form_id),
        &[StoredValue {
            field_id,
            value: "one".to_string(),
        }],
    )
    .await
    .unwrap();
    let second = EntryRepo::create_with_values(
        &pool,
        &new_entry(form_id),
        &[StoredValue {
            field_id,
            value: "two".to_string(),
        }],
    )
    .await
    .unwrap();

    let listed = EntryRepo::list_by_form(&pool, form_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].entry.id, second.id);
    assert_eq!(listed[1].entry.id, first.id);
    assert_eq!(listed[1].values[0].value, "one");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_value_insert_rolls_back_entry(pool: PgPool) {
    let (form_id, _, field_id) = seed_form(&pool).await;

    // Force a mid-batch failure: a NULL value violates NOT NULL, and the
    // enclosing transaction must take the already-inserted entry with it.
    let mut tx = pool.begin().await.unwrap();
    let entry_id: i64 = sqlx::query_scalar(
        "INSERT INTO form_entries (form_id, meta) VALUES ($1, '{}'::jsonb) RETURNING id",
    )
    .bind(form_id)
    .fetch_one(&mut *tx)
    .await
    .unwrap();
    let bad_insert = sqlx::query("INSERT INTO form_values (entry_id, field_id, value) VALUES ($1, $2, NULL)")
        .bind(entry_id)
        .bind(field_id)
        .execute(&mut *tx)
        .await;
    assert!(bad_insert.is_err());
    tx.rollback().await.unwrap();

    assert_eq!(EntryRepo::count_entries(&pool, form_id).await.unwrap(), 0);
    assert_eq!(EntryRepo::count_values(&pool, form_id).await.unwrap(), 0);
}
