#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use article_digest::{
    error::{ExtractionError, FetchError, ModelError},
    extract::{ContentExtractor, ExtractedArticle, ReadabilityExtractor},
    llm::TextGenerator,
    normalize::ResponseNormalizer,
    pipeline::SummaryPipeline,
    prompt::PromptBuilder,
    scraper::PageFetcher,
};

pub const VALID_SUMMARY: &str = r#"{"heading":"Rivers rise","descriptive_paragraph":"Water levels rose across the basin.","bullet_points":["Reservoirs opened","Bridges closed","More rain forecast"],"neutral_opinion":"The region is preparing for further flooding."}"#;

pub const ARTICLE_HTML: &str = r#"<html><head><title>Rivers Rising</title></head><body>
<nav class="menu"><a href="/">Home</a> <a href="/world">World News Section</a></nav>
<article>
  <p>Water levels across the northern basin rose sharply this week, prompting officials to open emergency reservoirs, close two bridges, and warn residents.</p>
  <p>Hydrologists said the combination of late snowmelt, heavy rain, and saturated soil left little room for absorption.</p>
</article>
<footer><p>Copyright Example News. All rights reserved, everywhere.</p></footer>
</body></html>"#;

pub enum FetchOutcome {
    Html(String),
    Status(u16),
    Timeout,
}

pub struct FakeFetcher {
    outcome: FetchOutcome,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn html(html: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: FetchOutcome::Html(html.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn status(code: u16) -> Arc<Self> {
        Arc::new(Self {
            outcome: FetchOutcome::Status(code),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            outcome: FetchOutcome::Timeout,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            FetchOutcome::Html(html) => Ok(html.clone()),
            FetchOutcome::Status(code) => Err(FetchError::Status {
                status: reqwest::StatusCode::from_u16(*code).unwrap(),
            }),
            FetchOutcome::Timeout => Err(FetchError::Timeout),
        }
    }
}

/// Wraps the real extractor and counts invocations.
pub struct CountingExtractor {
    inner: ReadabilityExtractor,
    pub calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: ReadabilityExtractor::new(50),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentExtractor for CountingExtractor {
    fn extract(&self, html: &str, source_url: &Url) -> Result<ExtractedArticle, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(html, source_url)
    }
}

pub struct FakeGenerator {
    reply: Result<String, String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(ModelError::Transport)
    }
}

pub fn pipeline(
    fetcher: Arc<FakeFetcher>,
    extractor: Arc<CountingExtractor>,
    generator: Arc<FakeGenerator>,
    max_chars: usize,
) -> SummaryPipeline {
    SummaryPipeline::new(
        fetcher,
        extractor,
        PromptBuilder::new(max_chars),
        generator,
        ResponseNormalizer::default(),
    )
}
