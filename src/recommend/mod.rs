mod engine;
mod forest;

pub use engine::{Prediction, Recommender, TrainedModel};
pub use forest::RandomForest;
