pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod startup;

use std::sync::Arc;

pub use config::{AppConfig, StoreBackend};
pub use db::DoctorStore;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DoctorStore>,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

/// Open the store selected by `config.store`
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn DoctorStore>, sqlx::Error> {
    match &config.store {
        StoreBackend::Postgres { database_url } => {
            let store = db::PgDoctorStore::connect(database_url).await?;
            tracing::info!("Connected to PostgreSQL store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(db::MemoryDoctorStore::new()))
        }
    }
}
