use crate::external::price_provider::PriceProvider;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub price_provider: Arc<dyn PriceProvider>,
}
