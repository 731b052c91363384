use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::AskArgs;
use crate::collab::{EchoGenerator, Embedder, LeadSummarizer};
use crate::compose::{ComposePolicy, ComposedPost, PromptMode, compose_post};
use crate::corpus::load_corpus;
use crate::index::SimilarityIndex;
use crate::lexical::LexicalIndex;
use crate::model::Corpus;
use crate::ranker::{HybridRanker, RankedCandidate};
use crate::router::{IntentPolicy, PatternIntentPolicy, RouteDecision};
use crate::semantic::{HashEmbedder, resolve_model_config};
use crate::summarize::{RetrievalBrief, summarize_ranked};
use crate::util::now_utc_string;

#[derive(Debug, Clone, Serialize)]
struct RetrievedArticle {
    rank: usize,
    doc_id: usize,
    headline: String,
    summary: String,
    semantic_distance: f64,
    semantic_similarity: f64,
    lexical_score: f64,
    combined_score: f64,
}

#[derive(Debug, Serialize)]
struct CorpusMetadata {
    documents: usize,
    duplicates_removed: usize,
    skipped_empty: usize,
    source_sha256: String,
}

#[derive(Debug, Serialize)]
struct RetrievalMetadata {
    top_k: usize,
    alpha: f64,
    oversample: usize,
    ranked_count: usize,
    summarized_count: usize,
    skipped_count: usize,
}

#[derive(Debug, Serialize)]
struct GenerationMetadata {
    mode: String,
    iterations: usize,
    final_max_length: usize,
    complete: bool,
    min_sentences: usize,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    query: String,
    route: String,
    corpus: CorpusMetadata,
    duration_ms: f64,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retrieval: Option<RetrievalMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    articles: Option<Vec<RetrievedArticle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation: Option<GenerationMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<String>,
}

pub fn run(args: AskArgs) -> Result<()> {
    let started = Instant::now();
    let query_text = args.query.trim();
    if query_text.is_empty() {
        bail!("query must not be empty");
    }

    let content = args
        .content
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let embedder = HashEmbedder::new(resolve_model_config(&args.model_id));
    info!(
        model_id = %embedder.config().model_id,
        backend = %embedder.config().backend,
        "embedding backend ready"
    );

    let corpus = load_corpus(&args.corpus_path, &embedder)?;
    let index = SimilarityIndex::build(
        corpus
            .documents
            .iter()
            .map(|document| document.embedding.clone())
            .collect(),
    )
    .context("failed to build similarity index")?;
    if index.is_empty() {
        warn!("similarity index is empty; retrieval requests will fail");
    } else {
        info!(
            vectors = index.len(),
            dimensions = index.dimensions(),
            "similarity index built"
        );
    }

    let bodies = corpus
        .documents
        .iter()
        .map(|document| document.body.as_str())
        .collect::<Vec<&str>>();
    let lexical = LexicalIndex::build(&bodies);
    info!(
        documents = lexical.doc_count(),
        vocabulary = lexical.vocabulary_size(),
        "lexical weights built"
    );

    let policy = PatternIntentPolicy::new()?;
    let route = policy.classify(query_text, content.is_some());
    info!(
        query = %query_text,
        route = route.as_str(),
        content_supplied = content.is_some(),
        "request routed"
    );

    let mut response = AskResponse {
        query: query_text.to_string(),
        route: route.as_str().to_string(),
        corpus: CorpusMetadata {
            documents: corpus.documents.len(),
            duplicates_removed: corpus.duplicate_count,
            skipped_empty: corpus.skipped_empty_count,
            source_sha256: corpus.source_hash.clone(),
        },
        duration_ms: 0.0,
        generated_at: now_utc_string(),
        retrieval: None,
        articles: None,
        generation: None,
        post: None,
    };

    match route {
        RouteDecision::Retrieve => {
            let (ranked, brief) =
                retrieve_and_summarize(&embedder, &corpus, &index, &lexical, query_text, &args)?;
            response.retrieval = Some(retrieval_metadata(&args, &ranked, &brief));
            response.articles = Some(to_articles(&ranked, &brief));
        }
        RouteDecision::Generate => {
            let (mode, source_text) = match content {
                Some(content) => (PromptMode::SuppliedContent, content),
                None => {
                    let (ranked, brief) = retrieve_and_summarize(
                        &embedder, &corpus, &index, &lexical, query_text, &args,
                    )?;
                    if brief.combined.is_empty() {
                        bail!("retrieval produced no usable brief for post drafting");
                    }
                    response.retrieval = Some(retrieval_metadata(&args, &ranked, &brief));
                    response.articles = Some(to_articles(&ranked, &brief));
                    (PromptMode::RetrievedBrief, brief.combined)
                }
            };

            let mut compose_policy = ComposePolicy::for_mode(mode);
            compose_policy.initial_max_length = args.initial_max_length;
            compose_policy.max_iterations = args.max_iterations.max(1);
            if let Some(min_sentences) = args.min_sentences {
                compose_policy.min_sentences = min_sentences;
            }

            let post = compose_post(&EchoGenerator, mode, &source_text, &compose_policy)
                .context("post drafting failed")?;

            info!(
                mode = mode.as_str(),
                iterations = post.iterations,
                final_max_length = post.final_max_length,
                complete = post.complete,
                "post drafted"
            );

            response.generation = Some(generation_metadata(mode, &compose_policy, &post));
            response.post = Some(post.text);
        }
    }

    response.duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        route = %response.route,
        duration_ms = response.duration_ms,
        "request completed"
    );

    if args.json {
        write_json_response(&response)?;
    } else {
        write_text_response(&response)?;
    }

    Ok(())
}

fn retrieve_and_summarize(
    embedder: &HashEmbedder,
    corpus: &Corpus,
    index: &SimilarityIndex,
    lexical: &LexicalIndex,
    query_text: &str,
    args: &AskArgs,
) -> Result<(Vec<RankedCandidate>, RetrievalBrief)> {
    let Some(query_embedding) = embedder.embed(query_text) else {
        bail!("query text produced no embedding");
    };

    let ranker = HybridRanker::new(index, lexical);
    let ranked = ranker
        .rank(
            &query_embedding,
            query_text,
            args.top_k,
            args.alpha,
            args.oversample,
        )
        .context("hybrid ranking failed")?;

    info!(
        requested = args.top_k,
        ranked = ranked.len(),
        alpha = args.alpha,
        "candidates ranked"
    );

    let brief = summarize_ranked(&LeadSummarizer, corpus, &ranked);
    Ok((ranked, brief))
}

fn retrieval_metadata(
    args: &AskArgs,
    ranked: &[RankedCandidate],
    brief: &RetrievalBrief,
) -> RetrievalMetadata {
    RetrievalMetadata {
        top_k: args.top_k,
        alpha: args.alpha,
        oversample: args.oversample,
        ranked_count: ranked.len(),
        summarized_count: brief.articles.len(),
        skipped_count: brief.skipped_count,
    }
}

fn generation_metadata(
    mode: PromptMode,
    policy: &ComposePolicy,
    post: &ComposedPost,
) -> GenerationMetadata {
    GenerationMetadata {
        mode: mode.as_str().to_string(),
        iterations: post.iterations,
        final_max_length: post.final_max_length,
        complete: post.complete,
        min_sentences: policy.min_sentences,
    }
}

fn to_articles(ranked: &[RankedCandidate], brief: &RetrievalBrief) -> Vec<RetrievedArticle> {
    brief
        .articles
        .iter()
        .enumerate()
        .map(|(position, article)| {
            let candidate = ranked
                .iter()
                .find(|candidate| candidate.doc_id == article.doc_id);
            RetrievedArticle {
                rank: position + 1,
                doc_id: article.doc_id,
                headline: article.headline.clone(),
                summary: article.summary.clone(),
                semantic_distance: candidate.map_or(0.0, |value| value.semantic_distance),
                semantic_similarity: candidate.map_or(0.0, |value| value.semantic_similarity),
                lexical_score: candidate.map_or(0.0, |value| value.lexical_score),
                combined_score: candidate.map_or(0.0, |value| value.combined_score),
            }
        })
        .collect()
}

fn write_json_response(response: &AskResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize ask json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(response: &AskResponse) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Query: {}", response.query)?;
    writeln!(
        output,
        "Route: {} (corpus: {} documents, duplicates removed: {}, skipped: {})",
        response.route,
        response.corpus.documents,
        response.corpus.duplicates_removed,
        response.corpus.skipped_empty,
    )?;

    if let Some(retrieval) = &response.retrieval {
        writeln!(
            output,
            "Retrieval: top_k={} alpha={:.2} oversample={} ranked={} summarized={} skipped={}",
            retrieval.top_k,
            retrieval.alpha,
            retrieval.oversample,
            retrieval.ranked_count,
            retrieval.summarized_count,
            retrieval.skipped_count,
        )?;
    }

    if let Some(articles) = &response.articles {
        for article in articles {
            writeln!(output, "{}.\t{}", article.rank, article.headline)?;
            writeln!(
                output,
                "\tscore={:.6} semantic={:.6} lexical={:.6} distance={:.6}",
                article.combined_score,
                article.semantic_similarity,
                article.lexical_score,
                article.semantic_distance,
            )?;
            writeln!(output, "\t{}", article.summary)?;
        }
    }

    if let Some(generation) = &response.generation {
        writeln!(
            output,
            "Post: mode={} complete={} iterations={} final_max_length={}",
            generation.mode,
            generation.complete,
            generation.iterations,
            generation.final_max_length,
        )?;
    }

    if let Some(post) = &response.post {
        writeln!(output)?;
        writeln!(output, "{post}")?;
    }

    output.flush()?;
    Ok(())
}
