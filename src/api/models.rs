use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(rename = "articleUrl", default)]
    pub article_url: Option<String>,
}

impl ParseRequest {
    /// The requested URL, if present and not blank.
    pub fn url(&self) -> Option<&str> {
        self.article_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
