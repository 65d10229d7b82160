use serde::Serialize;

use crate::config::RecommenderConfig;
use crate::error::{MoguError, Result};
use crate::models::{Context, DiningRecord};

use super::forest::RandomForest;

/// One ranked restaurant candidate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Prediction {
    pub restaurant_name: String,
    pub probability: f64,
}

/// Trains an ephemeral classifier over the full history on every request.
/// With tens to low thousands of records retraining is cheap, and it keeps
/// the model from ever drifting out of sync with storage.
pub struct Recommender {
    config: RecommenderConfig,
}

/// A forest fitted to one snapshot of the history, plus the label table
/// mapping class indices back to restaurant names. Class order is
/// first-seen order over the training records, which makes tie-breaking
/// deterministic for a fixed history.
#[derive(Debug)]
pub struct TrainedModel {
    forest: RandomForest,
    classes: Vec<String>,
    default_top_k: usize,
}

impl Recommender {
    pub fn new(config: &RecommenderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Below the minimum the signal is noise; callers must gate on this
    /// before training.
    pub fn is_trainable(&self, records: &[DiningRecord]) -> bool {
        records.len() >= self.config.min_records
    }

    pub fn train(&self, records: &[DiningRecord]) -> Result<TrainedModel> {
        if !self.is_trainable(records) {
            return Err(MoguError::Training(format!(
                "need at least {} records to train, have {}",
                self.config.min_records,
                records.len()
            )));
        }

        let mut classes: Vec<String> = Vec::new();
        let labels: Vec<usize> = records
            .iter()
            .map(|record| {
                match classes
                    .iter()
                    .position(|name| name == &record.restaurant_name)
                {
                    Some(index) => index,
                    None => {
                        classes.push(record.restaurant_name.clone());
                        classes.len() - 1
                    }
                }
            })
            .collect();

        let samples: Vec<[f32; 3]> = records.iter().map(DiningRecord::features).collect();

        tracing::debug!(
            records = records.len(),
            classes = classes.len(),
            trees = self.config.tree_count,
            "training recommendation forest"
        );

        let forest = RandomForest::fit(
            &samples,
            &labels,
            classes.len(),
            self.config.tree_count,
            self.config.seed,
        );

        Ok(TrainedModel {
            forest,
            classes,
            default_top_k: self.config.default_top_k,
        })
    }
}

impl TrainedModel {
    /// Up to `k` candidates sorted by descending probability, ties broken
    /// by class index. `None` uses the configured default (3).
    pub fn predict_top(&self, context: &Context, k: Option<usize>) -> Vec<Prediction> {
        let k = k.unwrap_or(self.default_top_k);
        let probabilities = self.forest.predict_proba(&context.features());

        let mut ranked: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(k)
            .map(|(index, probability)| Prediction {
                restaurant_name: self.classes[index].clone(),
                probability: probability as f64,
            })
            .collect()
    }

    pub fn class_count(&self) -> usize {
        self.forest.n_classes()
    }
}
