use tracing::{debug, warn};

use crate::collab::{GenerationOptions, Generator};
use crate::error::EngineError;

// The continuation is everything past the last delimiter occurrence in the
// raw collaborator output.
pub const POST_DELIMITER: &str = "LinkedIn Post:";
pub const SOURCE_LABEL: &str = "News Summary:";

const MAX_LENGTH_STEP: usize = 20;
const KEPT_SENTENCES: usize = 2;

// The prompt mode changes the instructional framing and the default
// acceptance bar, not the control logic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PromptMode {
    SuppliedContent,
    RetrievedBrief,
}

impl PromptMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuppliedContent => "supplied-content",
            Self::RetrievedBrief => "retrieved-brief",
        }
    }

    // Supplied content is already curated; a retrieved brief should yield
    // at least two sentences.
    pub fn default_min_sentences(self) -> usize {
        match self {
            Self::SuppliedContent => 1,
            Self::RetrievedBrief => 2,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ComposePolicy {
    pub initial_max_length: usize,
    pub max_iterations: usize,
    pub min_sentences: usize,
}

impl ComposePolicy {
    pub fn for_mode(mode: PromptMode) -> Self {
        Self {
            initial_max_length: 200,
            max_iterations: 3,
            min_sentences: mode.default_min_sentences(),
        }
    }
}

// `Drafting` and `Evaluating` are transient; `Accepted` and `Exhausted`
// are terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftState {
    Drafting {
        iteration: usize,
        max_length: usize,
    },
    Evaluating {
        iteration: usize,
        max_length: usize,
        draft: String,
    },
    Accepted {
        iteration: usize,
        max_length: usize,
        draft: String,
    },
    Exhausted {
        iteration: usize,
        max_length: usize,
        draft: String,
    },
}

// `complete == false` is a soft outcome: the last draft is still returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedPost {
    pub text: String,
    pub complete: bool,
    pub iterations: usize,
    pub final_max_length: usize,
}

// Pure transition out of `Evaluating`: accept a complete draft, grant more
// budget while iterations remain, or give up with the last draft. Any other
// state passes through unchanged.
pub fn evaluate_draft(state: DraftState, policy: &ComposePolicy) -> DraftState {
    let DraftState::Evaluating {
        iteration,
        max_length,
        draft,
    } = state
    else {
        return state;
    };

    if is_complete(&draft, policy.min_sentences) {
        return DraftState::Accepted {
            iteration,
            max_length,
            draft,
        };
    }

    if iteration < policy.max_iterations {
        return DraftState::Drafting {
            iteration: iteration + 1,
            max_length: max_length + MAX_LENGTH_STEP,
        };
    }

    DraftState::Exhausted {
        iteration,
        max_length,
        draft,
    }
}

// A collaborator failure aborts the request; an incomplete final draft
// does not.
pub fn compose_post(
    generator: &dyn Generator,
    mode: PromptMode,
    source_text: &str,
    policy: &ComposePolicy,
) -> Result<ComposedPost, EngineError> {
    let prompt = build_prompt(mode, source_text);
    let mut state = DraftState::Drafting {
        iteration: 1,
        max_length: policy.initial_max_length,
    };

    loop {
        state = match state {
            DraftState::Drafting {
                iteration,
                max_length,
            } => {
                let options = GenerationOptions {
                    max_length,
                    ..GenerationOptions::default()
                };
                let raw = generator.generate(&prompt, &options)?;
                let draft = trim_to_leading_sentences(extract_continuation(&raw));
                DraftState::Evaluating {
                    iteration,
                    max_length,
                    draft,
                }
            }
            DraftState::Evaluating { .. } => {
                let next = evaluate_draft(state, policy);
                if let DraftState::Drafting {
                    iteration,
                    max_length,
                } = &next
                {
                    debug!(
                        iteration,
                        max_length, "draft incomplete; raising generation budget"
                    );
                }
                next
            }
            DraftState::Accepted {
                iteration,
                max_length,
                draft,
            } => {
                return Ok(ComposedPost {
                    text: draft,
                    complete: true,
                    iterations: iteration,
                    final_max_length: max_length,
                });
            }
            DraftState::Exhausted {
                iteration,
                max_length,
                draft,
            } => {
                warn!(
                    iterations = iteration,
                    "drafting budget exhausted; returning incomplete post"
                );
                return Ok(ComposedPost {
                    text: draft,
                    complete: false,
                    iterations: iteration,
                    final_max_length: max_length,
                });
            }
        };
    }
}

pub fn build_prompt(mode: PromptMode, source_text: &str) -> String {
    match mode {
        PromptMode::SuppliedContent => format!(
            "You are an expert in corporate communications. Turn the provided \
             content into a polished, professional, and engaging LinkedIn post. \
             Do not echo these instructions or the content itself.\n\n\
             {SOURCE_LABEL} {source_text}\n\n{POST_DELIMITER}"
        ),
        PromptMode::RetrievedBrief => format!(
            "You are an expert in corporate communications. Generate a detailed, \
             professional, and engaging LinkedIn post that highlights the key \
             developments in the news brief below. Do not echo the instructions \
             or the brief.\n\n{SOURCE_LABEL} {source_text}\n\n{POST_DELIMITER}"
        ),
    }
}

// A delimiter-free output is used as-is, degraded but defined.
fn extract_continuation(raw: &str) -> &str {
    match raw.rfind(POST_DELIMITER) {
        Some(position) => raw[position + POST_DELIMITER.len()..].trim(),
        None => raw.trim(),
    }
}

// With more than two non-empty '.'-segments, keep the first two and restore
// the terminal period.
fn trim_to_leading_sentences(text: &str) -> String {
    let segments = text.split('.').collect::<Vec<&str>>();
    let non_empty = segments
        .iter()
        .filter(|segment| !segment.trim().is_empty())
        .count();
    if non_empty <= KEPT_SENTENCES {
        return text.trim().to_string();
    }

    let mut kept = segments
        .iter()
        .filter(|segment| !segment.trim().is_empty())
        .take(KEPT_SENTENCES)
        .map(|segment| segment.trim())
        .collect::<Vec<&str>>()
        .join(". ");
    kept.push('.');
    kept
}

fn is_complete(text: &str, min_sentences: usize) -> bool {
    let trimmed = text.trim();
    if !trimmed.ends_with(['.', '!', '?']) {
        return false;
    }

    let sentence_count = trimmed
        .split('.')
        .filter(|segment| !segment.trim().is_empty())
        .count();
    sentence_count >= min_sentences
}
