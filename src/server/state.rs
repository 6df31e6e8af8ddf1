use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::generation::GenerationClient;
use crate::job::{JobController, JobStore};
use crate::media::MediaOperator;
use crate::oracle::OracleClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: Client,
    pub jobs: JobStore,
    pub controller: JobController,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: Config) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .expect("failed to create HTTP client");

        let config = Arc::new(config);

        let media = Arc::new(MediaOperator::new().await);
        info!("media operator ready");

        let oracle = OracleClient::new(
            config.oracle_base_url.clone(),
            config.oracle_api_key.clone(),
            config.oracle_model.clone(),
            config.oracle_vision_model.clone(),
            config.oracle_timeout_s,
        );

        let generation = GenerationClient::new(
            http_client.clone(),
            config.generation_base_url.clone(),
            config.generation_api_key.clone(),
            config.generation_poll_interval_s,
            config.generation_timeout_s,
            config.generation_max_consecutive_errors,
        );

        let jobs = JobStore::new();
        let controller = JobController::new(
            config.clone(),
            jobs.clone(),
            media,
            oracle,
            generation,
            http_client.clone(),
        );

        Self {
            config,
            http_client,
            jobs,
            controller,
            started_at: Instant::now(),
        }
    }
}
