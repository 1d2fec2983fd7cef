use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::SchemaError;
use crate::summary::ArticleSummary;

/// Wrapper tokens a backend may put around its JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperMarkers {
    /// Fence tokens such as "```"; removed only at the very start or end.
    pub fences: Vec<String>,
    /// Language tags that may follow an opening fence, matched case-insensitively.
    pub language_tags: Vec<String>,
}

impl Default for WrapperMarkers {
    fn default() -> Self {
        Self {
            fences: vec!["```".to_string(), "~~~".to_string()],
            language_tags: vec!["json".to_string()],
        }
    }
}

/// Cleans, parses and validates raw model output.
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    markers: WrapperMarkers,
}

impl ResponseNormalizer {
    pub fn new(markers: WrapperMarkers) -> Self {
        Self { markers }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(WrapperMarkers {
            fences: config.response_fences.clone(),
            language_tags: config.response_language_tags.clone(),
        })
    }

    pub fn normalize(&self, raw: &str) -> Result<ArticleSummary, SchemaError> {
        let cleaned = self.strip_wrapping(raw);

        let value: Value =
            serde_json::from_str(cleaned).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

        let summary = ArticleSummary::new(
            required_text(object, "heading")?,
            required_text(object, "descriptive_paragraph")?,
            required_list(object, "bullet_points")?,
            required_text(object, "neutral_opinion")?,
        );
        debug!(bullets = summary.bullet_points().len(), "Model output validated");

        Ok(summary)
    }

    /// Removes a leading fence (with optional language tag) and a trailing
    /// fence, then trims. Anything in between is returned untouched.
    pub fn strip_wrapping<'a>(&self, raw: &'a str) -> &'a str {
        let mut text = raw.trim();

        if let Some(fence) = self.markers.fences.iter().find(|f| text.starts_with(f.as_str())) {
            text = self.strip_language_tag(&text[fence.len()..]);
        }

        if let Some(fence) = self.markers.fences.iter().find(|f| text.ends_with(f.as_str())) {
            text = &text[..text.len() - fence.len()];
        }

        text.trim()
    }

    fn strip_language_tag<'a>(&self, text: &'a str) -> &'a str {
        let text = text.trim_start_matches([' ', '\t']);

        for tag in &self.markers.language_tags {
            let Some(head) = text.get(..tag.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(tag) {
                continue;
            }

            let rest = &text[tag.len()..];
            let rest_trimmed = rest.trim_start();
            if rest.starts_with(char::is_whitespace)
                || rest_trimmed.starts_with('{')
                || rest_trimmed.starts_with('[')
            {
                return rest;
            }
        }

        text
    }
}

fn required_text(object: &Map<String, Value>, field: &str) -> Result<String, SchemaError> {
    let value = object
        .get(field)
        .ok_or_else(|| SchemaError::MissingField(field.to_string()))?;

    let text = value.as_str().ok_or_else(|| SchemaError::WrongType {
        field: field.to_string(),
        expected: "a string",
    })?;

    if text.trim().is_empty() {
        return Err(SchemaError::EmptyField(field.to_string()));
    }

    Ok(text.to_string())
}

fn required_list(object: &Map<String, Value>, field: &str) -> Result<Vec<String>, SchemaError> {
    let value = object
        .get(field)
        .ok_or_else(|| SchemaError::MissingField(field.to_string()))?;

    let items = value.as_array().ok_or_else(|| SchemaError::WrongType {
        field: field.to_string(),
        expected: "an array of strings",
    })?;

    if items.is_empty() {
        return Err(SchemaError::EmptyField(field.to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let entry = format!("{}[{}]", field, index);
            let text = item.as_str().ok_or_else(|| SchemaError::WrongType {
                field: entry.clone(),
                expected: "a string",
            })?;
            if text.trim().is_empty() {
                return Err(SchemaError::EmptyField(entry));
            }
            Ok(text.to_string())
        })
        .collect()
}
