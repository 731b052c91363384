use std::fs::{self, File};
use std::io::{BufWriter, Write};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::info;

use crate::cli::SampleArgs;
use crate::util::ensure_directory;

// Carves the first `sample_size` records out of a larger line-delimited
// dataset so development runs do not have to embed the full corpus. Records
// pass through untouched, extra fields included.
pub fn run(args: SampleArgs) -> Result<()> {
    if args.sample_size == 0 {
        bail!("sample size must be at least 1");
    }

    let raw = fs::read_to_string(&args.input_path)
        .with_context(|| format!("failed to read dataset: {}", args.input_path.display()))?;

    let mut records = Vec::<&str>::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        serde_json::from_str::<Value>(line)
            .with_context(|| format!("failed to parse dataset record on line {}", index + 1))?;
        records.push(line);
        if records.len() == args.sample_size {
            break;
        }
    }

    if records.is_empty() {
        bail!("dataset contains no records: {}", args.input_path.display());
    }

    if let Some(parent) = args.output_path.parent() {
        ensure_directory(parent)?;
    }

    let file = File::create(&args.output_path)
        .with_context(|| format!("failed to create sample file: {}", args.output_path.display()))?;
    let mut output = BufWriter::new(file);
    for line in &records {
        writeln!(output, "{line}")?;
    }
    output.flush()?;

    info!(
        input = %args.input_path.display(),
        output = %args.output_path.display(),
        requested = args.sample_size,
        written = records.len(),
        "sample written"
    );

    Ok(())
}
