use std::sync::Arc;

use escola_config::{CorsConfig, ReportConfig};
use escola_core::StoreError;
use escola_db::{EntityStore, PgEntityStore, init_db_pool};

/// Shared, read-only handler state. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub report_config: Arc<ReportConfig>,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, report_config: ReportConfig) -> Self {
        Self {
            store,
            report_config: Arc::new(report_config),
            cors_config: CorsConfig::default(),
        }
    }

    pub fn with_cors(mut self, cors_config: CorsConfig) -> Self {
        self.cors_config = cors_config;
        self
    }
}

pub async fn init_app_state(max_connections: u32) -> Result<AppState, StoreError> {
    let pool = init_db_pool(max_connections).await?;
    Ok(
        AppState::new(Arc::new(PgEntityStore::new(pool)), ReportConfig::from_env())
            .with_cors(CorsConfig::from_env()),
    )
}
