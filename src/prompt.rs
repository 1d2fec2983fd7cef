const INSTRUCTIONS: &str = r#"You are an expert content summarizer. Based on the following article text, generate a concise summary in a structured JSON format.
The JSON object MUST have exactly the following keys and data types:
- "heading": A short, catchy title for the summary (string).
- "descriptive_paragraph": A single, descriptive paragraph summarizing the main points (string).
- "bullet_points": An array of 3 to 5 key takeaways or important facts (array of strings).
- "neutral_opinion": A brief, neutral concluding thought or the core thesis of the article in one sentence (string).

Do not include any introductory text like "Here is the JSON summary" and do not wrap the output in code fences. Only output the raw JSON object.

Article Text:
---
"#;

/// Renders extracted text into the fixed summarization prompt.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_chars: usize,
}

impl PromptBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn build(&self, text: &str) -> String {
        let content = truncate_to_budget(text, self.max_chars);

        let mut result = String::with_capacity(INSTRUCTIONS.len() + content.len() + 1);
        result.push_str(INSTRUCTIONS);
        result.push_str(content);
        result.push('\n');
        result
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
///
/// This is a plain cut: it may end mid-sentence or mid-word.
pub fn truncate_to_budget(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
