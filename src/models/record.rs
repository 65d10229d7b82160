use chrono::NaiveDate;

use crate::error::{MoguError, Result};

/// Mood at mealtime, ordinal 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Happy = 1,
    Neutral = 2,
    Sad = 3,
}

impl Mood {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Mood {
    type Error = MoguError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Happy),
            2 => Ok(Self::Neutral),
            3 => Ok(Self::Sad),
            _ => Err(MoguError::InvalidContext(format!(
                "mood must be 1 (happy), 2 (neutral) or 3 (sad), got {value}"
            ))),
        }
    }
}

/// Weather at mealtime, ordinal 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weather {
    Sunny = 1,
    Rainy = 2,
    Cloudy = 3,
}

impl Weather {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Weather {
    type Error = MoguError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Sunny),
            2 => Ok(Self::Rainy),
            3 => Ok(Self::Cloudy),
            _ => Err(MoguError::InvalidContext(format!(
                "weather must be 1 (sunny), 2 (rainy) or 3 (cloudy), got {value}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    LateNight,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Breakfast => write!(f, "breakfast"),
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
            Self::LateNight => write!(f, "late_night"),
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "late_night" | "late-night" => Ok(Self::LateNight),
            _ => Err(format!("Unknown meal type: {s}")),
        }
    }
}

/// One logged meal. Append-only; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DiningRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_type: Option<MealType>,
    pub mood: Mood,
    pub weather: Weather,
    pub is_workday: bool,
    pub food_name: String,
    pub restaurant_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A record as submitted for persistence, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewDiningRecord {
    pub date: NaiveDate,
    pub meal_type: Option<MealType>,
    pub mood: Mood,
    pub weather: Weather,
    pub is_workday: bool,
    pub food_name: String,
    pub restaurant_name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl NewDiningRecord {
    /// The restaurant name is the class label the recommender trains on;
    /// an empty label must never reach storage.
    pub fn validate(&self) -> Result<()> {
        if self.restaurant_name.trim().is_empty() {
            return Err(MoguError::Validation(
                "restaurant_name cannot be empty".to_string(),
            ));
        }
        if self.food_name.trim().is_empty() {
            return Err(MoguError::Validation(
                "food_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The situation a recommendation is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub mood: Mood,
    pub weather: Weather,
    pub is_workday: bool,
}

impl Context {
    /// Build a context from raw encoded values, rejecting anything outside
    /// mood/weather {1,2,3} and workday {0,1}.
    pub fn from_raw(mood: i64, weather: i64, is_workday: i64) -> Result<Self> {
        let mood = Mood::try_from(mood)?;
        let weather = Weather::try_from(weather)?;
        let is_workday = match is_workday {
            0 => false,
            1 => true,
            other => {
                return Err(MoguError::InvalidContext(format!(
                    "is_workday must be 0 or 1, got {other}"
                )))
            }
        };
        Ok(Self {
            mood,
            weather,
            is_workday,
        })
    }

    pub fn features(&self) -> [f32; 3] {
        [
            self.mood.as_i64() as f32,
            self.weather.as_i64() as f32,
            self.is_workday as i64 as f32,
        ]
    }
}

impl DiningRecord {
    pub fn features(&self) -> [f32; 3] {
        [
            self.mood.as_i64() as f32,
            self.weather.as_i64() as f32,
            self.is_workday as i64 as f32,
        ]
    }
}
