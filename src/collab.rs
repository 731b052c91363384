// Seams for the external model capabilities the pipeline consumes:
// embedding, summarization, and generation. Components take these as
// injected handles, never as ambient shared state.

use crate::compose::{POST_DELIMITER, SOURCE_LABEL};
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SummaryWindow {
    pub min_words: usize,
    pub max_words: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct GenerationOptions {
    pub max_length: usize,
    pub temperature: f64,
    pub top_p: f64,
    pub truncation: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_length: 200,
            temperature: 0.7,
            top_p: 0.9,
            truncation: true,
        }
    }
}

pub trait Embedder {
    fn dimensions(&self) -> usize;

    // No vector when the input carries no embeddable text.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
}

pub trait Summarizer {
    fn summarize(&self, text: &str, window: SummaryWindow) -> Result<String, EngineError>;
}

pub trait Generator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, EngineError>;
}

// Extractive stand-in: keeps leading sentences within the requested window.
pub struct LeadSummarizer;

impl Summarizer for LeadSummarizer {
    fn summarize(&self, text: &str, window: SummaryWindow) -> Result<String, EngineError> {
        let words = text.split_whitespace().collect::<Vec<&str>>();
        if words.is_empty() {
            return Err(EngineError::collaborator(
                "summarization",
                "input text is empty",
            ));
        }

        let mut kept = Vec::<&str>::new();
        for sentence in text.split_inclusive(['.', '!', '?']) {
            let sentence_words = sentence.split_whitespace().collect::<Vec<&str>>();
            if !kept.is_empty() && kept.len() + sentence_words.len() > window.max_words {
                break;
            }
            kept.extend(sentence_words);
            if kept.len() >= window.min_words {
                break;
            }
        }

        if kept.len() > window.max_words {
            kept.truncate(window.max_words);
        }

        Ok(kept.join(" "))
    }
}

// Generative stand-in: echoes the prompt the way a causal model does, then
// continues with words from the prompt's source section, capped by
// `max_length` counted in continuation words. A short budget truncates
// mid-sentence, which is what drives the drafting loop to raise the budget.
pub struct EchoGenerator;

impl Generator for EchoGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, EngineError> {
        let source = prompt
            .rsplit_once(SOURCE_LABEL)
            .map(|(_, tail)| tail)
            .unwrap_or(prompt);
        let source = source
            .split_once(POST_DELIMITER)
            .map(|(head, _)| head)
            .unwrap_or(source);

        let words = source.split_whitespace().collect::<Vec<&str>>();
        if words.is_empty() {
            return Err(EngineError::collaborator(
                "generation",
                "prompt carries no source material",
            ));
        }

        let budget = options.max_length.max(1);
        let continuation = if options.truncation && words.len() > budget {
            words[..budget].join(" ")
        } else {
            words.join(" ")
        };

        Ok(format!("{prompt} {continuation}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_summarizer_rejects_empty_input() {
        let result = LeadSummarizer.summarize(
            "",
            SummaryWindow {
                min_words: 20,
                max_words: 40,
            },
        );
        assert!(matches!(
            result,
            Err(EngineError::Collaborator {
                collaborator: "summarization",
                ..
            })
        ));
    }

    #[test]
    fn lead_summarizer_honors_word_ceiling() {
        let text = "one two three four five six seven eight nine ten.";
        let summary = LeadSummarizer
            .summarize(
                text,
                SummaryWindow {
                    min_words: 2,
                    max_words: 4,
                },
            )
            .unwrap();
        assert!(summary.split_whitespace().count() <= 4);
        assert!(summary.starts_with("one"));
    }

    #[test]
    fn lead_summarizer_keeps_short_text_whole() {
        let text = "Markets rallied today. Analysts were surprised.";
        let summary = LeadSummarizer
            .summarize(
                text,
                SummaryWindow {
                    min_words: 3,
                    max_words: 40,
                },
            )
            .unwrap();
        assert!(summary.contains("Markets rallied"));
    }

    #[test]
    fn echo_generator_appends_source_after_prompt() {
        let prompt = format!("Instructions here.\n\n{SOURCE_LABEL} reforms announced today.\n\n{POST_DELIMITER}");
        let raw = EchoGenerator
            .generate(&prompt, &GenerationOptions::default())
            .unwrap();
        assert!(raw.starts_with(prompt.as_str()));
        assert!(raw.ends_with("reforms announced today."));
    }

    #[test]
    fn echo_generator_truncates_to_budget() {
        let prompt =
            format!("{SOURCE_LABEL} alpha beta gamma delta epsilon zeta.\n\n{POST_DELIMITER}");
        let options = GenerationOptions {
            max_length: 3,
            ..GenerationOptions::default()
        };
        let raw = EchoGenerator.generate(&prompt, &options).unwrap();
        let continuation = raw.rsplit_once(POST_DELIMITER).unwrap().1.trim();
        assert_eq!(continuation, "alpha beta gamma");
    }

    #[test]
    fn echo_generator_fails_without_source_material() {
        let prompt = format!("{SOURCE_LABEL}  \n\n{POST_DELIMITER}");
        let result = EchoGenerator.generate(&prompt, &GenerationOptions::default());
        assert!(matches!(
            result,
            Err(EngineError::Collaborator {
                collaborator: "generation",
                ..
            })
        ));
    }
}
