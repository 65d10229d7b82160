use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Local;
use validator::Validate;

use crate::db::repository::RecordRepository;
use crate::error::{MoguError, Result};
use crate::models::{Context, MealType, Mood, NewDiningRecord, Weather};

use super::dto::{
    DealsQuery, DealsResponse, HealthResponse, HistoryResponse, RecommendRequest,
    RecommendResponse, RecordResponse, SaveRecordRequest,
};
use super::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/v1/records`
pub async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<SaveRecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>)> {
    req.validate()
        .map_err(|e| MoguError::Validation(e.to_string()))?;

    let meal_type = match &req.meal_type {
        Some(raw) => Some(raw.parse::<MealType>().map_err(MoguError::Validation)?),
        None => None,
    };

    let record = NewDiningRecord {
        date: req.date.unwrap_or_else(|| Local::now().date_naive()),
        meal_type,
        mood: Mood::try_from(req.mood)?,
        weather: Weather::try_from(req.weather)?,
        is_workday: req.is_workday,
        food_name: req.food_name,
        restaurant_name: req.restaurant_name,
        lat: req.lat,
        lng: req.lng,
    };

    let conn = state.db.connect()?;
    let stored = RecordRepository::insert(&conn, &record).await?;

    tracing::info!(id = stored.id, restaurant = %stored.restaurant_name, "dining record saved");

    Ok((StatusCode::CREATED, Json(RecordResponse::from(stored))))
}

/// `GET /api/v1/records` — full history, oldest first. An empty history is
/// a 200 with an empty list, not an error.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let conn = state.db.connect()?;
    let records = RecordRepository::load_history(&conn).await?;

    let total = records.len();
    Ok(Json(HistoryResponse {
        records: records.into_iter().map(RecordResponse::from).collect(),
        total,
    }))
}

/// `POST /api/v1/recommendations` — retrain on the full history and rank
/// candidates for the given context.
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>> {
    let context = Context::from_raw(req.mood, req.weather, req.is_workday as i64)?;

    let conn = state.db.connect()?;
    let records = RecordRepository::load_history(&conn).await?;

    if !state.recommender.is_trainable(&records) {
        return Err(MoguError::Training(format!(
            "not enough dining records to recommend (have {}, need {}); log a few more meals first",
            records.len(),
            state.config.recommender.min_records
        )));
    }

    let model = state.recommender.train(&records)?;
    let predictions = model.predict_top(&context, req.limit);

    Ok(Json(RecommendResponse {
        predictions,
        trained_on: records.len(),
    }))
}

/// `GET /api/v1/deals` — cached deal listings, refreshed when stale or when
/// `?refresh=true` forces it.
pub async fn get_deals(
    State(state): State<AppState>,
    Query(query): Query<DealsQuery>,
) -> Result<Json<DealsResponse>> {
    let (deals, fetched_date) = state.deals.fetch_latest_deals(query.refresh).await?;

    let total = deals.len();
    Ok(Json(DealsResponse {
        deals,
        fetched_date,
        total,
    }))
}
