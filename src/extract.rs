use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::error::ExtractionError;

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, pre, blockquote").expect("Failed to parse paragraph selector")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a").expect("Failed to parse link selector")
});

static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:title']").expect("Failed to parse og:title selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

/// Paragraphs shorter than this do not contribute to scoring.
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Never part of article text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "object", "embed",
    "nav", "header", "footer", "aside", "form", "button", "input", "select", "textarea", "menu",
    "dialog",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

const UNLIKELY_HINTS: &[&str] = &[
    "advert", "banner", "breadcrumb", "combx", "comment", "community", "consent", "cookie",
    "disqus", "footer", "gdpr", "masthead", "menu", "modal", "nav", "newsletter", "pagination",
    "popup", "promo", "related", "share", "sidebar", "social", "sponsor", "subscribe", "widget",
];

const MAYBE_HINTS: &[&str] = &[
    "article", "body", "content", "entry", "main", "post", "story", "text",
];

/// Plain text isolated from a page; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub text_content: String,
    pub title: Option<String>,
}

/// Turns raw HTML into the page's main article text.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, source_url: &Url) -> Result<ExtractedArticle, ExtractionError>;
}

/// Readability-style extractor: scores paragraph containers by prose density
/// and keeps the best one.
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    min_chars: usize,
}

impl ReadabilityExtractor {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, source_url: &Url) -> Result<ExtractedArticle, ExtractionError> {
        if html.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let title = document_title(&document);

        let mut text = best_candidate(&document)
            .map(readable_text)
            .unwrap_or_default();

        if text.chars().count() < self.min_chars.max(1) {
            // Pages without scoreable paragraphs still get a chance through the cleaned body.
            if let Some(body) = document.select(&BODY_SELECTOR).next() {
                let body_text = readable_text(body);
                if body_text.chars().count() > text.chars().count() {
                    text = body_text;
                }
            }
        }

        let chars = text.chars().count();
        if text.trim().is_empty() || chars < self.min_chars {
            return Err(ExtractionError::NoContent {
                chars,
                min: self.min_chars,
            });
        }

        debug!(url = %source_url, chars, title = ?title, "Extracted article text");
        Ok(ExtractedArticle {
            text_content: text,
            title,
        })
    }
}

fn best_candidate<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
    // Candidates stay in the order they were first scored so ties resolve the same way every run.
    let mut candidates = Vec::new();
    let mut positions = HashMap::new();

    let mut add_score = |element: ElementRef<'a>, score: f64| {
        let index = *positions.entry(element.id()).or_insert_with(|| {
            candidates.push((element, initial_score(element)));
            candidates.len() - 1
        });
        candidates[index].1 += score;
    };

    for paragraph in document.select(&PARAGRAPH_SELECTOR) {
        if is_excluded(paragraph) || paragraph.ancestors().filter_map(ElementRef::wrap).any(is_excluded) {
            continue;
        }

        let text = collapse_whitespace(&paragraph.text().collect::<String>());
        let len = text.chars().count();
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let score = 1.0 + text.matches(',').count() as f64 + (len / 100).min(3) as f64;

        let mut ancestors = paragraph.ancestors().filter_map(ElementRef::wrap);
        if let Some(parent) = ancestors.next() {
            add_score(parent, score);

            if let Some(grandparent) = ancestors.next() {
                add_score(grandparent, score / 2.0);
            }
        }
    }

    candidates
        .into_iter()
        .map(|(element, score)| (element, score * (1.0 - link_density(element))))
        .fold(None, |best: Option<(ElementRef<'a>, f64)>, (element, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((element, score)),
        })
        .map(|(element, _)| element)
}

fn initial_score(element: ElementRef<'_>) -> f64 {
    let tag_score = match element.value().name() {
        "article" | "main" | "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };

    tag_score + class_weight(element)
}

fn class_weight(element: ElementRef<'_>) -> f64 {
    let mut weight = 0.0;
    for hint in [element.value().attr("class"), element.value().id()].into_iter().flatten() {
        let hint = hint.to_ascii_lowercase();
        if UNLIKELY_HINTS.iter().any(|h| hint.contains(h)) {
            weight -= 25.0;
        }
        if MAYBE_HINTS.iter().any(|h| hint.contains(h)) {
            weight += 25.0;
        }
    }
    weight
}

fn is_excluded(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return true;
    }
    if matches!(name, "html" | "body" | "article" | "main") {
        return false;
    }

    let hints = [element.value().attr("class"), element.value().id()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();

    UNLIKELY_HINTS.iter().any(|h| hints.contains(h)) && !MAYBE_HINTS.iter().any(|h| hints.contains(h))
}

fn link_density(element: ElementRef<'_>) -> f64 {
    let total = text_len(element);
    if total == 0 {
        return 0.0;
    }
    let linked: usize = element.select(&LINK_SELECTOR).map(text_len).sum();
    (linked as f64 / total as f64).min(1.0)
}

fn text_len(element: ElementRef<'_>) -> usize {
    collapse_whitespace(&element.text().collect::<String>()).chars().count()
}

/// Text of `root` with skipped subtrees removed, one line per block.
fn readable_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(root, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    let block = BLOCK_TAGS.contains(&element.value().name());
    if block {
        out.push('\n');
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !is_excluded(child_element) {
                push_text(child_element, out);
            }
        } else if let Node::Text(text) = child.value() {
            // Source line breaks are not paragraph breaks.
            out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
        }
    }

    if block {
        out.push('\n');
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn document_title(document: &Html) -> Option<String> {
    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .filter_map(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .find(|title| !title.is_empty());

    og_title.or_else(|| {
        document
            .select(&TITLE_SELECTOR)
            .map(|title| collapse_whitespace(&title.text().collect::<String>()))
            .find(|title| !title.is_empty())
    })
}
