use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::deals::{DealService, TextSearch};
use crate::recommend::Recommender;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub deals: Arc<DealService>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(config: Config, db: Database, search: Arc<dyn TextSearch>) -> Self {
        let config = Arc::new(config);
        let deals = Arc::new(DealService::new(db.clone(), search, &config.deals));
        let recommender = Arc::new(Recommender::new(&config.recommender));

        Self {
            config,
            db,
            deals,
            recommender,
        }
    }
}
