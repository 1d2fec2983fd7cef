pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod scraper;
pub mod summary;

use std::sync::Arc;
use std::time::Duration;
use crate::config::Config;
use crate::error::ConfigError;
use crate::pipeline::SummaryPipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SummaryPipeline>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: SummaryPipeline, request_timeout: Duration) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            request_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            SummaryPipeline::from_config(config)?,
            config.request_timeout,
        ))
    }
}
