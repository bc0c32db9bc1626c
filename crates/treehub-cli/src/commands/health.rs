//! Connectivity checks for the configured backends.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use treehub_cache::CacheManager;
use treehub_core::config::AppConfig;
use treehub_core::error::AppError;
use treehub_core::traits::{CacheProvider, StorageProvider};
use treehub_database::DatabasePool;
use treehub_storage::LocalStorageProvider;

/// Health check display row
#[derive(Debug, Serialize, Tabled)]
struct HealthRow {
    /// Component
    component: &'static str,
    /// Status
    status: String,
}

impl HealthRow {
    fn new(component: &'static str, result: Result<bool, AppError>) -> Self {
        let status = match result {
            Ok(true) => "ok".to_string(),
            Ok(false) => "unhealthy".to_string(),
            Err(e) => format!("error: {}", e),
        };
        Self { component, status }
    }

    fn healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Execute the health command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let database = match DatabasePool::connect(&config.database).await {
        Ok(pool) => {
            let result = pool.health_check().await;
            pool.close().await;
            result
        }
        Err(e) => Err(e),
    };

    let storage = match LocalStorageProvider::new(&config.storage.matter_root).await {
        Ok(storage) => storage.health_check().await,
        Err(e) => Err(e),
    };

    let cache = match CacheManager::new(&config.cache) {
        Ok(cache) => cache.health_check().await,
        Err(e) => Err(e),
    };

    let rows = vec![
        HealthRow::new("database", database),
        HealthRow::new("storage", storage),
        HealthRow::new("cache", cache),
    ];
    output::print_list(&rows, format);

    if rows.iter().all(HealthRow::healthy) {
        Ok(())
    } else {
        Err(AppError::internal("One or more components are unhealthy"))
    }
}
