use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use mapa_shared::MapConfig;

#[derive(Clone)]
pub struct AppState {
    /// Fixed after startup; env overrides are read once in `main`.
    pub map_config: Arc<MapConfig>,
    pub started_at: DateTime<Utc>,
    pub config_requests_total: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(map_config: MapConfig) -> Self {
        Self {
            map_config: Arc::new(map_config),
            started_at: Utc::now(),
            config_requests_total: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_config_request(&self) {
        self.config_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn config_requests(&self) -> u64 {
        self.config_requests_total.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}
