use tracing::warn;

use crate::collab::{Summarizer, SummaryWindow};
use crate::model::Corpus;
use crate::ranker::RankedCandidate;

#[derive(Debug, Clone)]
pub struct ArticleSummary {
    pub doc_id: usize,
    pub headline: String,
    pub summary: String,
}

// Per-article summaries plus the combined brief handed to post drafting
// when the user supplied no content.
#[derive(Debug, Clone)]
pub struct RetrievalBrief {
    pub articles: Vec<ArticleSummary>,
    pub combined: String,
    pub skipped_count: usize,
}

// Very short inputs are not stretched, long inputs are not over-compressed.
pub fn summary_window(word_count: usize) -> SummaryWindow {
    if word_count < 50 {
        SummaryWindow {
            min_words: 20,
            max_words: 40,
        }
    } else {
        SummaryWindow {
            min_words: word_count.min(40),
            max_words: (word_count + 20).min(100),
        }
    }
}

// A per-article collaborator failure drops that article's contribution and
// the aggregate carries on.
pub fn summarize_ranked(
    summarizer: &dyn Summarizer,
    corpus: &Corpus,
    ranked: &[RankedCandidate],
) -> RetrievalBrief {
    let mut articles = Vec::<ArticleSummary>::with_capacity(ranked.len());
    let mut skipped_count = 0usize;

    for candidate in ranked {
        let Some(document) = corpus.documents.get(candidate.doc_id) else {
            skipped_count += 1;
            warn!(doc_id = candidate.doc_id, "ranked candidate missing from corpus; skipping");
            continue;
        };

        let window = summary_window(document.body.split_whitespace().count());
        match summarizer.summarize(&document.body, window) {
            Ok(summary) => articles.push(ArticleSummary {
                doc_id: document.id,
                headline: document.headline.clone(),
                summary,
            }),
            Err(error) => {
                skipped_count += 1;
                warn!(
                    doc_id = document.id,
                    error = %error,
                    "summarization failed for article; skipping"
                );
            }
        }
    }

    let combined = articles
        .iter()
        .map(|article| article.summary.as_str())
        .collect::<Vec<&str>>()
        .join(" ");

    RetrievalBrief {
        articles,
        combined,
        skipped_count,
    }
}
