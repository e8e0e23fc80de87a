use card_optimizer::config::AppConfig;
use card_optimizer::error::AppError;
use card_optimizer::rewards::{
    BonusEntry, CategoryCatalog, FileKeyValueStore, NominatimClient, RewardsService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service wired to the on-disk store and the configured reverse geocoder.
pub(crate) type LiveRewardsService = RewardsService<FileKeyValueStore, NominatimClient>;

pub(crate) fn build_service(config: &AppConfig) -> Result<LiveRewardsService, AppError> {
    let catalog = CategoryCatalog::load(config.catalog.path.as_deref())?;
    let store = Arc::new(FileKeyValueStore::new(config.storage.store_dir.clone()));
    let lookup = Arc::new(NominatimClient::new(&config.geocoder));
    Ok(RewardsService::new(store, lookup, catalog))
}

pub(crate) fn parse_bonus(raw: &str) -> Result<BonusEntry, String> {
    raw.parse::<BonusEntry>().map_err(|err| err.to_string())
}
