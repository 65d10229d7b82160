mod deal;
mod record;

pub use deal::{DealEntry, DealSource};
pub use record::{Context, DiningRecord, MealType, Mood, NewDiningRecord, Weather};
