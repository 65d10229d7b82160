use chrono::NaiveDate;
use libsql::{params, Connection};

use crate::error::{MoguError, Result};
use crate::models::{DiningRecord, MealType, Mood, NewDiningRecord, Weather};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct RecordRepository;

impl RecordRepository {
    /// Append one record and return it with the id the store assigned.
    pub async fn insert(conn: &Connection, record: &NewDiningRecord) -> Result<DiningRecord> {
        record.validate()?;

        conn.execute(
            r#"
            INSERT INTO dining_records (
                date, meal_type, mood, weather, is_work, food_name, restaurant_name, lat, lng
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.date.format(DATE_FORMAT).to_string(),
                record.meal_type.map(|m| m.to_string()),
                record.mood.as_i64(),
                record.weather.as_i64(),
                record.is_workday as i64,
                record.food_name.clone(),
                record.restaurant_name.clone(),
                record.lat,
                record.lng,
            ],
        )
        .await?;

        let id = conn.last_insert_rowid();

        Ok(DiningRecord {
            id,
            date: record.date,
            meal_type: record.meal_type,
            mood: record.mood,
            weather: record.weather,
            is_workday: record.is_workday,
            food_name: record.food_name.clone(),
            restaurant_name: record.restaurant_name.clone(),
            lat: record.lat,
            lng: record.lng,
        })
    }

    /// Every record in insertion order, oldest first. An empty store is an
    /// empty vec, not an error.
    pub async fn load_history(conn: &Connection) -> Result<Vec<DiningRecord>> {
        let mut rows = conn
            .query(
                "SELECT id, date, meal_type, mood, weather, is_work,
                        food_name, restaurant_name, lat, lng
                 FROM dining_records ORDER BY id ASC",
                (),
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_record(&row)?);
        }
        Ok(records)
    }

    fn row_to_record(row: &libsql::Row) -> Result<DiningRecord> {
        let date_str: String = row.get(1)?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| MoguError::Internal(format!("corrupt record date '{date_str}': {e}")))?;

        let meal_type = match row.get::<Option<String>>(2)? {
            Some(raw) => Some(
                raw.parse::<MealType>()
                    .map_err(MoguError::Internal)?,
            ),
            None => None,
        };

        let mood = Mood::try_from(row.get::<i64>(3)?)?;
        let weather = Weather::try_from(row.get::<i64>(4)?)?;

        Ok(DiningRecord {
            id: row.get(0)?,
            date,
            meal_type,
            mood,
            weather,
            is_workday: row.get::<i64>(5)? != 0,
            food_name: row.get(6)?,
            restaurant_name: row.get(7)?,
            lat: row.get(8)?,
            lng: row.get(9)?,
        })
    }
}
