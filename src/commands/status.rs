use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::corpus::parse_records;
use crate::semantic::{normalize_whitespace, resolve_model_config};
use crate::util::sha256_file;

// Read-only corpus health report; nothing is embedded.
pub fn run(args: StatusArgs) -> Result<()> {
    if !args.corpus_path.exists() {
        warn!(path = %args.corpus_path.display(), "corpus file missing");
        return Ok(());
    }

    let raw = fs::read_to_string(&args.corpus_path)
        .with_context(|| format!("failed to read corpus file: {}", args.corpus_path.display()))?;
    let records = parse_records(&raw)?;

    let mut seen = HashSet::<(String, String)>::new();
    let mut duplicate_count = 0usize;
    let mut empty_count = 0usize;
    for record in &records {
        if !seen.insert((record.headline.clone(), record.short_description.clone())) {
            duplicate_count += 1;
            continue;
        }
        if normalize_whitespace(&record.short_description).is_empty() {
            empty_count += 1;
        }
    }

    let source_hash = sha256_file(&args.corpus_path)?;
    let model = resolve_model_config(&args.model_id);

    info!(
        path = %args.corpus_path.display(),
        sha256 = %source_hash,
        records = records.len(),
        duplicates = duplicate_count,
        empty_descriptions = empty_count,
        indexable = records.len() - duplicate_count - empty_count,
        "corpus status"
    );
    info!(
        model_id = %model.model_id,
        model_name = %model.model_name,
        dimensions = model.dimensions,
        normalization = %model.normalization,
        backend = %model.backend,
        "embedding model"
    );

    Ok(())
}
