use crate::config::settings::AppConfig;
use crate::infrastructure::queue::jobs::JobQueue;
use crate::infrastructure::storage::local::LocalStorage;
use crate::middleware::rate_limit::RateLimiter;
use crate::modules::asset::repository::AssetRepository;
use crate::modules::job::repository::JobRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub assets: AssetRepository,
    pub jobs: JobRepository,
    pub storage: LocalStorage,
    pub queue: JobQueue,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let storage = LocalStorage::new(&config.storage_dir);
        let limiter = RateLimiter::new(config.rate_limit_per_minute);
        Self {
            config,
            assets: AssetRepository::new(),
            jobs: JobRepository::new(),
            storage,
            queue: JobQueue::unbounded(),
            limiter,
        }
    }
}
