use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::collab::Embedder;
use crate::model::{Corpus, Document, NewsRecord};
use crate::util::sha256_file;

pub fn load_corpus(path: &Path, embedder: &dyn Embedder) -> Result<Corpus> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file: {}", path.display()))?;
    let records = parse_records(&raw)?;
    let record_count = records.len();

    let mut seen = HashSet::<(String, String)>::new();
    let mut documents = Vec::<Document>::new();
    let mut duplicate_count = 0usize;
    let mut skipped_empty_count = 0usize;

    for record in records {
        if !seen.insert((record.headline.clone(), record.short_description.clone())) {
            duplicate_count += 1;
            continue;
        }

        let Some(embedding) = embedder.embed(&record.short_description) else {
            skipped_empty_count += 1;
            warn!(
                headline = %record.headline,
                "record has no embeddable description; skipping"
            );
            continue;
        };

        documents.push(Document {
            id: documents.len(),
            headline: record.headline,
            body: record.short_description,
            embedding,
        });
    }

    let source_hash = sha256_file(path)?;

    info!(
        path = %path.display(),
        records = record_count,
        documents = documents.len(),
        duplicates_removed = duplicate_count,
        skipped_empty = skipped_empty_count,
        "corpus loaded"
    );

    Ok(Corpus {
        documents,
        source_hash,
        duplicate_count,
        skipped_empty_count,
    })
}

// Blank lines are skipped; a malformed line fails the whole load with its
// line number.
pub fn parse_records(raw: &str) -> Result<Vec<NewsRecord>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<NewsRecord>(line)
                .with_context(|| format!("failed to parse corpus record on line {}", index + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{DEFAULT_MODEL_ID, HashEmbedder, resolve_model_config};

    const SAMPLE: &str = concat!(
        "{\"headline\": \"Reform bill passes\", \"short_description\": \"The chamber approved sweeping tax reform.\", \"category\": \"POLITICS\"}\n",
        "\n",
        "{\"headline\": \"Reform bill passes\", \"short_description\": \"The chamber approved sweeping tax reform.\"}\n",
        "{\"headline\": \"Cup final tonight\", \"short_description\": \"Two rivals meet for the trophy.\"}\n",
    );

    #[test]
    fn parse_records_skips_blank_lines_and_keeps_order() {
        let records = parse_records(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].headline, "Reform bill passes");
        assert_eq!(records[2].headline, "Cup final tonight");
    }

    #[test]
    fn parse_records_reports_malformed_line_number() {
        let error = parse_records("{\"headline\": \"ok\"}\nnot json\n").unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }

    #[test]
    fn loader_drops_duplicates_and_unembeddable_records() {
        let embedder = HashEmbedder::new(resolve_model_config(DEFAULT_MODEL_ID));
        let with_empty = format!(
            "{SAMPLE}{}",
            "{\"headline\": \"Empty body\", \"short_description\": \"   \"}\n"
        );

        let dir = std::env::temp_dir().join("newsdesk-corpus-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.json");
        std::fs::write(&path, with_empty).unwrap();

        let corpus = load_corpus(&path, &embedder).unwrap();
        assert_eq!(corpus.documents.len(), 2);
        assert_eq!(corpus.duplicate_count, 1);
        assert_eq!(corpus.skipped_empty_count, 1);
        assert_eq!(corpus.documents[0].id, 0);
        assert_eq!(corpus.documents[1].id, 1);
        assert_eq!(corpus.documents[1].headline, "Cup final tonight");
        assert_eq!(corpus.source_hash.len(), 64);
    }
}
