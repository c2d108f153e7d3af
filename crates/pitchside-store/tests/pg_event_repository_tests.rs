//! Integration tests for `PgEventRepository`, driven through encounter
//! streams written by the encounter command handlers.

use chrono::NaiveDate;
use pitchside_core::error::DomainError;
use pitchside_core::fields::{FieldMap, FieldValue};
use pitchside_core::module::Module;
use pitchside_core::repository::{EventRepository, StoredEvent};
use pitchside_encounters::application::command_handlers::{
    handle_create_encounter, handle_record_module_data, handle_void_encounter,
};
use pitchside_encounters::application::query_handlers::{get_encounter_by_id, get_module_data};
use pitchside_encounters::domain::commands::{
    CreateEncounter, RecordMode, RecordModuleData, VoidEncounter,
};
use pitchside_encounters::domain::events::{
    ENCOUNTER_CREATED_EVENT_TYPE, MODULE_DATA_RECORDED_EVENT_TYPE,
};
use pitchside_store::pg_event_repository::PgEventRepository;
use pitchside_test_support::FixedClock;
use sqlx::PgPool;
use uuid::Uuid;

fn clock() -> FixedClock {
    FixedClock::on(2026, 3, 2)
}

fn create_command(module: Module) -> CreateEncounter {
    CreateEncounter {
        correlation_id: Uuid::new_v4(),
        player_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        module,
        created_by: Uuid::new_v4(),
    }
}

fn heart_rate(bpm: f64) -> FieldMap {
    FieldMap::from([("resting_hr".to_string(), FieldValue::from(bpm))])
}

/// Creates a medical exam encounter and returns its id and first event.
async fn created_encounter(repo: &PgEventRepository) -> (Uuid, StoredEvent) {
    let result = handle_create_encounter(&create_command(Module::MedicalExam), &clock(), repo)
        .await
        .unwrap();
    let event = result.stored_events.into_iter().next().unwrap();
    (result.aggregate_id, event)
}

/// `event` moved to another stream position under a fresh event id.
fn restamped(event: &StoredEvent, aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        sequence_number,
        ..event.clone()
    }
}

fn assert_conflict(result: Result<(), DomainError>, aggregate: Uuid, want_expected: i64, want_actual: i64) {
    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id,
            expected,
            actual,
        }) => {
            assert_eq!(aggregate_id, aggregate);
            assert_eq!(expected, want_expected);
            assert_eq!(actual, want_actual);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unknown_encounter_has_no_events(pool: PgPool) {
    let repo = PgEventRepository::new(pool);

    let events = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(events.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_encounter_lifecycle_is_stored_in_order(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let (encounter_id, created) = created_encounter(&repo).await;

    // Act
    handle_record_module_data(
        &RecordModuleData {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            module: Module::MedicalExam,
            fields: heart_rate(52.0),
            mode: RecordMode::Create,
        },
        &clock(),
        &repo,
    )
    .await
    .unwrap();

    // Assert
    let events = repo.load_events(encounter_id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, created.event_id);
    assert_eq!(events[0].occurred_at, created.occurred_at);
    assert_eq!(events[0].payload, created.payload);
    assert_eq!(events[0].event_type, ENCOUNTER_CREATED_EVENT_TYPE);
    assert_eq!(events[1].event_type, MODULE_DATA_RECORDED_EVENT_TYPE);
    assert_eq!(events[1].sequence_number, 2);
    let view = get_encounter_by_id(encounter_id, &repo).await.unwrap();
    assert_eq!(view.version, 2);
    assert!(view.has_module_data);
    assert_eq!(
        get_module_data(encounter_id, Module::MedicalExam, &repo).await.unwrap(),
        Some(heart_rate(52.0))
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_stale_writer_is_rejected_by_version_check(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let (encounter_id, created) = created_encounter(&repo).await;
    handle_void_encounter(
        &VoidEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            reason: "duplicate intake".into(),
        },
        &clock(),
        &repo,
    )
    .await
    .unwrap();

    // Act: a writer that last saw version 1 appends past the live head,
    // so no sequence number collides.
    let result = repo
        .append_events(encounter_id, 1, &[restamped(&created, encounter_id, 3)])
        .await;

    // Assert
    assert_conflict(result, encounter_id, 1, 2);
    assert_eq!(repo.load_events(encounter_id).await.unwrap().len(), 2);
    assert!(get_encounter_by_id(encounter_id, &repo).await.unwrap().voided);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_second_create_for_same_stream_conflicts(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let (encounter_id, created) = created_encounter(&repo).await;

    let result = repo
        .append_events(encounter_id, 0, &[restamped(&created, encounter_id, 1)])
        .await;

    assert_conflict(result, encounter_id, 0, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_colliding_batch_is_rolled_back_as_a_whole(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let (_, created) = created_encounter(&repo).await;
    let target = Uuid::new_v4();
    let batch = [
        restamped(&created, target, 1),
        restamped(&created, target, 2),
        restamped(&created, target, 2),
    ];

    // Act
    let result = repo.append_events(target, 0, &batch).await;

    // Assert
    assert_conflict(result, target, 0, 2);
    assert!(repo.load_events(target).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_empty_append_is_a_no_op_even_with_stale_version(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let (encounter_id, created) = created_encounter(&repo).await;

    repo.append_events(encounter_id, 0, &[]).await.unwrap();
    repo.append_events(Uuid::new_v4(), 7, &[]).await.unwrap();

    let events = repo.load_events(encounter_id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, created.event_id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_repeated_void_appends_nothing(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let (encounter_id, _) = created_encounter(&repo).await;
    let void = VoidEncounter {
        correlation_id: Uuid::new_v4(),
        encounter_id,
        reason: "created in error".into(),
    };

    // Act
    handle_void_encounter(&void, &clock(), &repo).await.unwrap();
    let again = handle_void_encounter(&void, &clock(), &repo).await.unwrap();

    // Assert
    assert!(again.stored_events.is_empty());
    assert_eq!(get_encounter_by_id(encounter_id, &repo).await.unwrap().version, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_streams_are_isolated_per_encounter(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let (first, _) = created_encounter(&repo).await;
    let (second, _) = created_encounter(&repo).await;

    handle_void_encounter(
        &VoidEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id: first,
            reason: "wrong player".into(),
        },
        &clock(),
        &repo,
    )
    .await
    .unwrap();

    assert!(get_encounter_by_id(first, &repo).await.unwrap().voided);
    let untouched = get_encounter_by_id(second, &repo).await.unwrap();
    assert!(!untouched.voided);
    assert_eq!(untouched.version, 1);
}
