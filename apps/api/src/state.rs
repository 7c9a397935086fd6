//! Shared application state.

use std::sync::Arc;

use pizzatrack_core::SaleEngine;
use pizzatrack_db::{Database, SqliteSaleStore};

/// Handed to every handler. Cloning is cheap: the pool and the engine are
/// shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sales: Arc<SaleEngine<SqliteSaleStore>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let sales = Arc::new(SaleEngine::new(db.sale_store()));
        AppState { db, sales }
    }
}
