use anyhow::{Context, Result};
use regex::Regex;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteDecision {
    Retrieve,
    Generate,
}

impl RouteDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Generate => "generate",
        }
    }
}

// Implementations must be pure and deterministic; the trait exists so the
// rule-based policy below and a learned classifier are interchangeable
// without touching callers.
pub trait IntentPolicy {
    fn classify(&self, query_text: &str, content_supplied: bool) -> RouteDecision;
}

// Supplied content always means the user wants a post drafted; so does a
// query mentioning "linkedin" in any spelling variant ("LinkedIn",
// "linked in", "linked-in"). Everything else is a retrieval request.
pub struct PatternIntentPolicy {
    post_pattern: Regex,
}

impl PatternIntentPolicy {
    pub fn new() -> Result<Self> {
        let post_pattern = Regex::new(r"(?i)\blink(?:ed)?[\s-]?in\b")
            .context("failed to compile post-intent pattern")?;
        Ok(Self { post_pattern })
    }
}

impl IntentPolicy for PatternIntentPolicy {
    fn classify(&self, query_text: &str, content_supplied: bool) -> RouteDecision {
        if content_supplied {
            return RouteDecision::Generate;
        }
        if self.post_pattern.is_match(query_text) {
            return RouteDecision::Generate;
        }
        RouteDecision::Retrieve
    }
}
