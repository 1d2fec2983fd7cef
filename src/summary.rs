use serde::Serialize;

/// A validated article digest.
///
/// Instances only come out of [`crate::normalize::ResponseNormalizer`], after
/// every field has been checked, and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    heading: String,
    descriptive_paragraph: String,
    bullet_points: Vec<String>,
    neutral_opinion: String,
}

impl ArticleSummary {
    pub(crate) fn new(
        heading: String,
        descriptive_paragraph: String,
        bullet_points: Vec<String>,
        neutral_opinion: String,
    ) -> Self {
        Self {
            heading,
            descriptive_paragraph,
            bullet_points,
            neutral_opinion,
        }
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn descriptive_paragraph(&self) -> &str {
        &self.descriptive_paragraph
    }

    pub fn bullet_points(&self) -> &[String] {
        &self.bullet_points
    }

    pub fn neutral_opinion(&self) -> &str {
        &self.neutral_opinion
    }

    /// Word count over every field, handy for logging.
    pub fn word_count(&self) -> usize {
        let bullets: usize = self
            .bullet_points
            .iter()
            .map(|point| point.split_whitespace().count())
            .sum();

        self.heading.split_whitespace().count()
            + self.descriptive_paragraph.split_whitespace().count()
            + bullets
            + self.neutral_opinion.split_whitespace().count()
    }
}
