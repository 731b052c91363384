use serde::Deserialize;

// Extra record fields (category, authors, link, date) are tolerated and
// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsRecord {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub short_description: String,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: usize,
    pub headline: String,
    pub body: String,
    pub embedding: Vec<f32>,
}

// Built once at process start, read-only afterwards.
#[derive(Debug)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub source_hash: String,
    pub duplicate_count: usize,
    pub skipped_empty_count: usize,
}
