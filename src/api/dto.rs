use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{DealEntry, DiningRecord};
use crate::recommend::Prediction;

#[derive(Debug, Deserialize, Validate)]
pub struct SaveRecordRequest {
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    pub meal_type: Option<String>,
    #[validate(range(min = 1, max = 3, message = "mood must be 1, 2 or 3"))]
    pub mood: i64,
    #[validate(range(min = 1, max = 3, message = "weather must be 1, 2 or 3"))]
    pub weather: i64,
    pub is_workday: bool,
    #[validate(length(min = 1, message = "food_name cannot be empty"))]
    pub food_name: String,
    #[validate(length(min = 1, message = "restaurant_name cannot be empty"))]
    pub restaurant_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_type: Option<String>,
    pub mood: i64,
    pub weather: i64,
    pub is_workday: bool,
    pub food_name: String,
    pub restaurant_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<DiningRecord> for RecordResponse {
    fn from(record: DiningRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            meal_type: record.meal_type.map(|m| m.to_string()),
            mood: record.mood.as_i64(),
            weather: record.weather.as_i64(),
            is_workday: record.is_workday,
            food_name: record.food_name,
            restaurant_name: record.restaurant_name,
            lat: record.lat,
            lng: record.lng,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<RecordResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub mood: i64,
    pub weather: i64,
    pub is_workday: bool,
    /// How many candidates to return; server default applies when omitted.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub predictions: Vec<Prediction>,
    pub trained_on: usize,
}

#[derive(Debug, Deserialize)]
pub struct DealsQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct DealsResponse {
    pub deals: Vec<DealEntry>,
    pub fetched_date: NaiveDate,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
