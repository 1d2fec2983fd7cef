use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::extract::{ContentExtractor, ReadabilityExtractor};
use crate::llm::{build_generator, TextGenerator};
use crate::normalize::ResponseNormalizer;
use crate::prompt::PromptBuilder;
use crate::scraper::{parse_url, HttpFetcher, PageFetcher};
use crate::summary::ArticleSummary;

/// Fetch → extract → prompt → generate → normalize, failing fast.
#[derive(Clone)]
pub struct SummaryPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    prompts: PromptBuilder,
    generator: Arc<dyn TextGenerator>,
    normalizer: ResponseNormalizer,
}

impl SummaryPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ContentExtractor>,
        prompts: PromptBuilder,
        generator: Arc<dyn TextGenerator>,
        normalizer: ResponseNormalizer,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            prompts,
            generator,
            normalizer,
        }
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(HttpFetcher::from_config(config)?),
            Arc::new(ReadabilityExtractor::new(config.extract_min_chars)),
            PromptBuilder::new(config.prompt_max_chars),
            build_generator(config)?,
            ResponseNormalizer::from_config(config),
        ))
    }

    #[instrument(skip(self), fields(model = %self.generator.model()))]
    pub async fn run(&self, url: &str) -> Result<ArticleSummary> {
        let result = self.run_stages(url).await;
        if let Err(err) = &result {
            warn!(stage = err.stage(), error = %err, "Pipeline failed");
        }
        result
    }

    async fn run_stages(&self, url: &str) -> Result<ArticleSummary> {
        let url = parse_url(url)?;

        let fetch_start = Instant::now();
        let html = self.fetcher.fetch(&url).await?;
        info!(elapsed = ?fetch_start.elapsed(), bytes = html.len(), "HTML fetch successful");

        let article = self.extractor.extract(&html, &url)?;
        info!(
            chars = article.text_content.chars().count(),
            title = article.title.as_deref().unwrap_or(""),
            "Extracted article text"
        );

        let prompt = self.prompts.build(&article.text_content);
        info!(chars = prompt.chars().count(), "Built prompt");

        let llm_start = Instant::now();
        let completion = self.generator.generate(&prompt).await?;
        info!(elapsed = ?llm_start.elapsed(), "Model call successful");

        let summary = self.normalizer.normalize(&completion)?;
        info!(words = summary.word_count(), "Summary ready");

        Ok(summary)
    }
}
