/// Storage behavior observed through the public trait
use super::*;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tokio_test::{assert_err, assert_ok};

fn storage() -> (SqliteStorage, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
    (storage, temp_file)
}

#[test]
fn test_storage_is_object_safe() {
    let (storage, _db) = storage();
    let _: &dyn HabitStorage = &storage;
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let (storage, _db) = storage();
    let user = UserId(10);
    let habit_id = storage.create_habit(user, "Read").await.unwrap();
    storage.record_completion(habit_id, 2).await.unwrap();

    let first = storage.get_habit_summary(habit_id, user).await.unwrap();
    let second = storage.get_habit_summary(habit_id, user).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(
        storage.list_habits(user).await.unwrap(),
        storage.list_habits(user).await.unwrap()
    );
}

#[tokio::test]
async fn test_delete_cascades_to_completions() {
    let (storage, _db) = storage();
    let user = UserId(1);
    let keep = storage.create_habit(user, "Keep").await.unwrap();
    let doomed = storage.create_habit(user, "Drop").await.unwrap();
    storage.record_completion(keep, 1).await.unwrap();
    storage.record_completion(doomed, 3).await.unwrap();

    assert!(storage.delete_habit(doomed, user).await.unwrap());

    assert!(storage.completion_times(doomed).await.unwrap().is_empty());
    assert_eq!(storage.get_statistics(doomed, Period::Year).await.unwrap(), 0);
    assert!(storage.get_habit_summary(doomed, user).await.unwrap().is_none());
    assert_eq!(storage.get_statistics(keep, Period::Year).await.unwrap(), 1);
}

#[tokio::test]
async fn test_counts_only_grow_until_delete() {
    let (storage, _db) = storage();
    let user = UserId(1);
    let habit_id = storage.create_habit(user, "Water").await.unwrap();

    let mut previous = 0;
    for count in [1, 4, 100, 2] {
        storage.record_completion(habit_id, count).await.unwrap();
        let total = storage
            .get_habit_summary(habit_id, user)
            .await
            .unwrap()
            .unwrap()
            .total_completions;
        assert_eq!(total, previous + count as u64);
        previous = total;
    }
}

#[tokio::test]
async fn test_week_boundary_is_monday_midnight() {
    let (storage, _db) = storage();
    let habit_id = storage.create_habit(UserId(1), "Run").await.unwrap();

    let today = Utc::now().date_naive();
    let (week_start, _) = date_range(Period::Week, today);
    let monday = Utc.from_utc_datetime(&week_start);

    assert_ok!(storage.record_completion_at(habit_id, 2, monday).await);
    assert_ok!(
        storage
            .record_completion_at(habit_id, 7, monday - Duration::minutes(1))
            .await
    );

    assert_eq!(storage.get_statistics(habit_id, Period::Week).await.unwrap(), 2);
}

#[tokio::test]
async fn test_rejects_bad_writes() {
    let (storage, _db) = storage();
    let habit_id = storage.create_habit(UserId(1), "Nap").await.unwrap();

    assert_err!(storage.record_completion(habit_id, 0).await);
    assert_err!(storage.record_completion(HabitId(9999), 1).await);
    assert!(!storage.delete_habit(habit_id, UserId(2)).await.unwrap());
    assert!(!storage.delete_habit(HabitId(9999), UserId(1)).await.unwrap());
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp_file.path().to_path_buf();
    let when = Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(8, 30, 0).unwrap(),
    );

    let habit_id = {
        let storage = SqliteStorage::new(path.clone()).unwrap();
        let id = storage.create_habit(UserId(5), "Leap").await.unwrap();
        storage.record_completion_at(id, 3, when).await.unwrap();
        id
    };

    let storage = SqliteStorage::new(path).unwrap();
    let summary = storage.get_habit_summary(habit_id, UserId(5)).await.unwrap().unwrap();
    assert_eq!(summary.name, "Leap");
    assert_eq!(summary.total_completions, 3);
    assert_eq!(summary.last_completed_at, Some(when));
}
