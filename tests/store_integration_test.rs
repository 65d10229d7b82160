use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use mogu::config::DatabaseConfig;
use mogu::db::repository::RecordRepository;
use mogu::db::Database;
use mogu::models::{MealType, Mood, NewDiningRecord, Weather};

fn new_record(restaurant: &str) -> NewDiningRecord {
    NewDiningRecord {
        date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        meal_type: Some(MealType::Lunch),
        mood: Mood::Neutral,
        weather: Weather::Cloudy,
        is_workday: true,
        food_name: "pork cutlet rice".to_string(),
        restaurant_name: restaurant.to_string(),
        lat: None,
        lng: None,
    }
}

async fn memory_db() -> Database {
    Database::new(&DatabaseConfig {
        url: ":memory:".to_string(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn save_then_load_includes_record_with_new_id() {
    let db = memory_db().await;
    let conn = db.connect().unwrap();

    let before = RecordRepository::load_history(&conn).await.unwrap();

    let stored = RecordRepository::insert(&conn, &new_record("Gongcan Bento"))
        .await
        .unwrap();

    let after = RecordRepository::load_history(&conn).await.unwrap();
    assert_eq!(after.len(), before.len() + 1);

    let found = after
        .iter()
        .find(|r| r.id == stored.id)
        .expect("saved record must be visible");
    assert_eq!(found.restaurant_name, "Gongcan Bento");
    assert!(
        before.iter().all(|r| r.id != stored.id),
        "assigned id must be new"
    );
}

#[tokio::test]
async fn ids_are_unique_across_many_saves() {
    let db = memory_db().await;
    let conn = db.connect().unwrap();

    let mut ids = Vec::new();
    for i in 0..20 {
        let stored = RecordRepository::insert(&conn, &new_record(&format!("place {i}")))
            .await
            .unwrap();
        ids.push(stored.id);
    }

    let mut deduped = ids.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
}

#[tokio::test]
async fn empty_store_is_empty_history_not_error() {
    let db = memory_db().await;
    let conn = db.connect().unwrap();

    let history = RecordRepository::load_history(&conn).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn migration_keeps_rows_written_by_old_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.db");

    // Simulate a database produced by the first release, before meal_type
    // and the coordinate columns existed.
    {
        let raw = libsql::Builder::new_local(path.to_str().unwrap())
            .build()
            .await
            .unwrap();
        let conn = raw.connect().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE dining_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                mood INTEGER NOT NULL,
                weather INTEGER NOT NULL,
                is_work INTEGER NOT NULL,
                food_name TEXT NOT NULL,
                restaurant_name TEXT NOT NULL
            );
            INSERT INTO dining_records (date, mood, weather, is_work, food_name, restaurant_name)
            VALUES ('2024-12-24', 1, 2, 0, 'hotpot', 'Wu Xian Ji'),
                   ('2024-12-25', 3, 3, 1, 'noodles', 'A Wan');
            "#,
        )
        .await
        .unwrap();
    }

    let db = Database::new(&DatabaseConfig {
        url: format!("file:{}", path.display()),
    })
    .await
    .unwrap();
    let conn = db.connect().unwrap();

    let history = RecordRepository::load_history(&conn).await.unwrap();
    assert_eq!(history.len(), 2, "migration must not drop rows");

    for record in &history {
        assert_eq!(record.meal_type, None);
        assert_eq!(record.lat, None);
        assert_eq!(record.lng, None);
    }
    assert_eq!(history[0].restaurant_name, "Wu Xian Ji");
    assert_eq!(history[1].restaurant_name, "A Wan");

    // New writes work against the migrated schema.
    let mut record = new_record("Post Migration Diner");
    record.lat = Some(22.63);
    record.lng = Some(120.32);
    let stored = RecordRepository::insert(&conn, &record).await.unwrap();
    assert!(stored.id > 2);

    let history = RecordRepository::load_history(&conn).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].lat, Some(22.63));
}
