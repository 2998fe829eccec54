//! Tantivy schema and analyzer configuration.
//!
//! Every document is stored under three fields:
//! - **`_id`**: raw, stored identifier used for lookups and upserts
//! - **`_all`**: every scalar value of the document joined into one text field
//! - **`body`**: the full document as a stored, indexed JSON object

use tantivy::schema::{
    IndexRecordOption, JsonObjectOptions, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer,
};
use tantivy::Index;

use crate::config::{Analyzer, IndexMapping};

/// Document identifier field.
pub const ID_FIELD: &str = "_id";

/// Composite field holding all scalar values of a document.
pub const ALL_FIELD: &str = "_all";

/// JSON field holding the document itself.
pub const BODY_FIELD: &str = "body";

/// Tokens longer than this are dropped at analysis time.
const MAX_TOKEN_LEN: usize = 40;

const EN_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Build the schema for a new index.
pub fn build_schema(mapping: &IndexMapping) -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field(ID_FIELD, STRING | STORED);

    let indexing = TextFieldIndexing::default()
        .set_tokenizer(mapping.analyzer.tokenizer_name())
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);

    builder.add_text_field(
        ALL_FIELD,
        TextOptions::default().set_indexing_options(indexing.clone()),
    );
    builder.add_json_field(
        BODY_FIELD,
        JsonObjectOptions::default()
            .set_stored()
            .set_indexing_options(indexing),
    );

    builder.build()
}

/// Register every analyzer a schema may refer to.
///
/// Tokenizers are not persisted with the index, so this must run on open as
/// well as on create.
pub fn register_analyzers(index: &Index) {
    let standard = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .build();

    let english = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            EN_STOP_WORDS.iter().map(|word| word.to_string()),
        ))
        .filter(Stemmer::new(Language::English))
        .build();

    index
        .tokenizers()
        .register(Analyzer::Standard.tokenizer_name(), standard);
    index
        .tokenizers()
        .register(Analyzer::En.tokenizer_name(), english);
}
