//! Integration tests for the achievement engine over a real SQLite database.

use chrono::{Duration, FixedOffset, TimeZone, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use facilityd::achievements::{evaluator, seed};
use facilityd::storage::Storage;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

async fn make_storage(dir: &TempDir) -> Storage {
    Storage::new(dir.path()).await.unwrap()
}

/// Insert a check-in with an explicit timestamp (the API always stamps now).
async fn backdated_check_in(storage: &Storage, user_id: &str, location_id: &str, at: &str) {
    sqlx::query("INSERT INTO check_ins (id, user_id, location_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(location_id)
        .bind(at)
        .execute(&storage.pool())
        .await
        .unwrap();
}

fn day_stamp(n: i64) -> String {
    (Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)).to_rfc3339()
}

#[tokio::test]
async fn empty_definitions_yield_empty_result() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    let user = storage.create_user("nobody").await.unwrap();

    // No seed: no definitions at all.
    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    assert!(views.is_empty());
}

#[tokio::test]
async fn fresh_user_has_everything_locked_sorted_by_threshold() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("newcomer").await.unwrap();

    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    assert_eq!(views.len(), seed::builtin().len());
    assert!(views.iter().all(|v| !v.is_unlocked));
    assert!(views.iter().all(|v| v.progress == 0));
    assert!(views.windows(2).all(|w| w[0].threshold <= w[1].threshold));
}

#[tokio::test]
async fn review_threshold_unlocks_and_persists_once() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("critic").await.unwrap();
    let loc = storage
        .create_location("North Hall B1", "", "toilet", 25.01, 121.53, Some("B1"))
        .await
        .unwrap();
    storage
        .create_review(&user.id, &loc.id, 4, "clean enough")
        .await
        .unwrap();

    let first = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let unlocked = first.iter().find(|v| v.id == "first-review").unwrap();
    assert!(unlocked.is_unlocked);
    assert_eq!(unlocked.progress, 100);
    assert_eq!(unlocked.current, 1);
    assert!(unlocked.unlocked_at.is_some());

    // Idempotence: a second evaluation changes nothing and writes nothing.
    let second = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let ids_first: Vec<_> = first.iter().map(|v| (&v.id, v.is_unlocked, v.progress)).collect();
    let ids_second: Vec<_> = second.iter().map(|v| (&v.id, v.is_unlocked, v.progress)).collect();
    assert_eq!(ids_first, ids_second);

    let unlocks = storage.list_unlocks(&user.id).await.unwrap();
    assert_eq!(unlocks.len(), 1);
    assert_eq!(unlocks[0].achievement_id, "first-review");
}

#[tokio::test]
async fn unlocked_sort_before_locked() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("critic").await.unwrap();
    let loc = storage
        .create_location("Library 2F", "", "toilet", 25.02, 121.54, None)
        .await
        .unwrap();
    storage.create_review(&user.id, &loc.id, 5, "").await.unwrap();

    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let first_locked = views.iter().position(|v| !v.is_unlocked).unwrap();
    assert!(views[..first_locked].iter().all(|v| v.is_unlocked));
    assert!(views[first_locked..].iter().all(|v| !v.is_unlocked));
    // Within the locked group, thresholds stay ascending.
    assert!(views[first_locked..]
        .windows(2)
        .all(|w| w[0].threshold <= w[1].threshold));
}

#[tokio::test]
async fn partial_progress_is_proportional() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("reporter").await.unwrap();
    let loc = storage
        .create_location("Gym 1F", "", "toilet", 25.03, 121.55, None)
        .await
        .unwrap();
    for _ in 0..2 {
        storage
            .create_report(&user.id, &loc.id, "dirty", "")
            .await
            .unwrap();
    }

    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    // threshold 5, current 2 → 40%, locked.
    let watchdog = views.iter().find(|v| v.id == "facility-watchdog").unwrap();
    assert!(!watchdog.is_unlocked);
    assert_eq!(watchdog.current, 2);
    assert_eq!(watchdog.progress, 40);
    // threshold 1, current 2 → unlocked.
    let first = views.iter().find(|v| v.id == "first-report").unwrap();
    assert!(first.is_unlocked);
}

#[tokio::test]
async fn approved_requests_feed_the_request_criterion() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("pioneer").await.unwrap();
    let request = storage
        .create_facility_request(&user.id, "New annex toilet", "", "toilet", 25.0, 121.5, None)
        .await
        .unwrap();

    // Pending request does not count.
    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let blazer = views.iter().find(|v| v.id == "trailblazer").unwrap();
    assert!(!blazer.is_unlocked);
    assert_eq!(blazer.current, 0);

    storage
        .set_facility_request_status(&request.id, "approved")
        .await
        .unwrap();
    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let blazer = views.iter().find(|v| v.id == "trailblazer").unwrap();
    assert!(blazer.is_unlocked);
    assert_eq!(blazer.current, 1);
}

#[tokio::test]
async fn seven_day_streak_unlocks_week_regular() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("regular").await.unwrap();
    let loc = storage
        .create_location("Dorm A", "", "toilet", 25.04, 121.56, None)
        .await
        .unwrap();
    for n in 0..7 {
        backdated_check_in(&storage, &user.id, &loc.id, &day_stamp(n)).await;
    }

    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let week = views.iter().find(|v| v.id == "week-regular").unwrap();
    assert!(week.is_unlocked);
    assert_eq!(week.current, 1);
    let thirty = views.iter().find(|v| v.id == "thirty-days").unwrap();
    assert!(!thirty.is_unlocked);
    assert_eq!(thirty.current, 7);
    // 7/30 days → 23%.
    assert_eq!(thirty.progress, 23);
}

#[tokio::test]
async fn five_same_day_check_ins_unlock_frequent_visitor() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("busy").await.unwrap();
    let loc = storage
        .create_location("Cafeteria", "", "toilet", 25.05, 121.57, None)
        .await
        .unwrap();
    let base = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
    for n in 0..5 {
        let at = (base + Duration::hours(n)).to_rfc3339();
        backdated_check_in(&storage, &user.id, &loc.id, &at).await;
    }

    let views = evaluator::evaluate(&storage, &user.id, utc()).await.unwrap();
    let frequent = views.iter().find(|v| v.id == "frequent-visitor").unwrap();
    assert!(frequent.is_unlocked);
    assert_eq!(frequent.current, 5);
    // Five same-day check-ins are still a single streak day.
    let week = views.iter().find(|v| v.id == "week-regular").unwrap();
    assert_eq!(week.current, 0);
}

#[tokio::test]
async fn unlock_insert_is_conflict_free() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    let user = storage.create_user("racer").await.unwrap();
    let now = Utc::now().to_rfc3339();

    let first = storage
        .insert_unlock(&user.id, "first-review", &now)
        .await
        .unwrap();
    let second = storage
        .insert_unlock(&user.id, "first-review", &now)
        .await
        .unwrap();
    assert!(first);
    assert!(!second);
    assert_eq!(storage.list_unlocks(&user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn seed_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = make_storage(&dir).await;
    seed::seed(&storage).await.unwrap();
    seed::seed(&storage).await.unwrap();
    let defs = storage.list_achievements().await.unwrap();
    assert_eq!(defs.len(), seed::builtin().len());
}
