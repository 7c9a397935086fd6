//! # Pizzatrack API
//!
//! HTTP JSON server behind the pizzeria admin console: recipe catalog,
//! ingredient inventory (almacén), the point-of-sale commit and the daily
//! sales report.
//!
//! ## Module Organization
//! ```text
//! pizzatrack_api/
//! ├── lib.rs          ◄─── You are here (exports & tracing setup)
//! ├── main.rs         ◄─── Binary: config, pool, serve, shutdown
//! ├── config.rs       ◄─── Environment configuration
//! ├── state.rs        ◄─── Shared handler state
//! ├── dto.rs          ◄─── Console JSON shapes
//! ├── error.rs        ◄─── ApiError and status mapping
//! └── routes/
//!     ├── mod.rs      ◄─── Router assembly, CORS, health
//!     ├── pizzas.rs   ◄─── Recipes, sales, daily report
//!     └── almacen.rs  ◄─── Ingredient CRUD
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/pizzas/ventas                                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SaleRequest ──► Cart ──► SaleEngine::commit_sale ──► SqliteSaleStore   │
//! │                                 │                                       │
//! │                     Ok(receipt) │ Err(SaleError)                        │
//! │                                 ▼                                       │
//! │                  201 SaleResponse │ ApiError (400/404/409/500)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::{build_app, cors_layer};
pub use state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pizzatrack=trace` - Show trace for pizzatrack crates only
/// - Default: INFO, DEBUG for pizzatrack, WARN for sqlx
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pizzatrack=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
