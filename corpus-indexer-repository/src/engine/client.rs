//! Tantivy index implementation.
//!
//! This module provides the concrete implementation of `IndexEngine`
//! backed by a Tantivy index stored in a local directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value as _};
use tantivy::{
    Document as _, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term,
};
use tracing::{debug, error, info, instrument, warn};

use crate::config::IndexMapping;
use crate::engine::fields::{collect_paths, collect_text, lookup_path, FieldRegistry};
use crate::engine::index_config::{
    build_schema, register_analyzers, ALL_FIELD, BODY_FIELD, ID_FIELD,
};
use crate::errors::IndexError;
use crate::interfaces::IndexEngine;
use crate::types::IndexBatch;
use corpus_indexer_shared::{DocumentBody, SearchHit, SearchRequest, SearchResponse};

/// Memory budget handed to the Tantivy index writer.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// File Tantivy writes at the root of every index directory.
const META_FILE: &str = "meta.json";

/// Key used to wrap document bodies that are not JSON objects.
const WRAPPED_VALUE_KEY: &str = "value";

/// Largest `from + size` a search may ask for.
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Full-text index stored in a local directory.
///
/// Cloning is cheap; every clone refers to the same underlying index, so a
/// single `TantivyIndex` can be shared between the ingestion task and the
/// query API.
///
/// # Example
///
/// ```ignore
/// let (index, created) = TantivyIndex::open_or_create("corpus.tantivy", &IndexMapping::default())?;
/// let mut batch = index.new_batch();
/// batch.index("doc-1", Document::from_fields("doc-1", json!({"name": "Shock Top"})));
/// index.apply_batch(batch).await?;
/// ```
#[derive(Clone)]
pub struct TantivyIndex {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    index: Index,
    schema: Schema,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: FieldRegistry,
    id_field: Field,
    all_field: Field,
    body_field: Field,
}

impl TantivyIndex {
    /// Open an existing index.
    ///
    /// # Returns
    ///
    /// * `Ok(TantivyIndex)` - The opened index
    /// * `Err(IndexError::NotFound)` - If no index exists at `path`
    /// * `Err(IndexError)` - If the index exists but cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        if !path.join(META_FILE).exists() {
            return Err(IndexError::not_found(path));
        }

        let index = Index::open_in_dir(path).map_err(|e| IndexError::open(e.to_string()))?;
        let opened = Self::from_index(path, index)?;

        info!(path = %path.display(), "Opened existing index");
        Ok(opened)
    }

    /// Create a new index with the given mapping.
    ///
    /// # Returns
    ///
    /// * `Ok(TantivyIndex)` - The new, empty index
    /// * `Err(IndexError::AlreadyExists)` - If an index already exists at `path`
    pub fn create(path: impl AsRef<Path>, mapping: &IndexMapping) -> Result<Self, IndexError> {
        let path = path.as_ref();
        if path.join(META_FILE).exists() {
            return Err(IndexError::already_exists(path));
        }

        std::fs::create_dir_all(path)?;
        let index = Index::create_in_dir(path, build_schema(mapping))
            .map_err(|e| IndexError::open(e.to_string()))?;
        let created = Self::from_index(path, index)?;

        info!(
            path = %path.display(),
            analyzer = mapping.analyzer.tokenizer_name(),
            "Created new index"
        );
        Ok(created)
    }

    /// Open the index at `path`, creating it when it does not exist.
    ///
    /// The returned flag is `true` when the index was newly created.
    pub fn open_or_create(
        path: impl AsRef<Path>,
        mapping: &IndexMapping,
    ) -> Result<(Self, bool), IndexError> {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(index) => Ok((index, false)),
            Err(e) if e.is_not_found() => Ok((Self::create(path, mapping)?, true)),
            Err(e) => Err(e),
        }
    }

    /// Directory holding the index.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn from_index(path: &Path, index: Index) -> Result<Self, IndexError> {
        register_analyzers(&index);

        let schema = index.schema();
        let id_field = schema
            .get_field(ID_FIELD)
            .map_err(|e| IndexError::open(e.to_string()))?;
        let all_field = schema
            .get_field(ALL_FIELD)
            .map_err(|e| IndexError::open(e.to_string()))?;
        let body_field = schema
            .get_field(BODY_FIELD)
            .map_err(|e| IndexError::open(e.to_string()))?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| IndexError::open(e.to_string()))?;
        let writer: IndexWriter = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| IndexError::open(e.to_string()))?;
        let fields = FieldRegistry::load(path)?;

        Ok(Self {
            inner: Arc::new(Inner {
                path: path.to_path_buf(),
                index,
                schema,
                reader,
                writer: Mutex::new(writer),
                fields,
                id_field,
                all_field,
                body_field,
            }),
        })
    }
}

impl Inner {
    fn apply(&self, batch: IndexBatch) -> Result<(), IndexError> {
        let count = batch.len();
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| IndexError::write("index writer lock poisoned"))?;

        let paths = match self.stage(&mut writer, batch) {
            Ok(paths) => paths,
            Err(e) => {
                Self::rollback(&mut writer);
                return Err(e);
            }
        };

        if let Err(e) = writer.commit() {
            Self::rollback(&mut writer);
            return Err(IndexError::write(format!("Commit failed: {}", e)));
        }
        drop(writer);
        debug!(count = count, "Committed batch");

        // The batch is durable from here on; later failures only delay
        // visibility or the field list.
        if let Err(e) = self.reader.reload() {
            warn!(error = %e, "Reader reload after commit failed");
        }
        if let Err(e) = self.fields.extend(paths) {
            warn!(error = %e, "Failed to record field paths after commit");
        }
        Ok(())
    }

    /// Add every entry to the writer without committing.
    fn stage(
        &self,
        writer: &mut IndexWriter,
        batch: IndexBatch,
    ) -> Result<BTreeSet<String>, IndexError> {
        let mut paths = BTreeSet::new();

        for (id, document) in batch.into_entries() {
            let body = match document.body {
                DocumentBody::Fields(value) => value,
                DocumentBody::Raw(bytes) => serde_json::from_slice(&bytes)
                    .map_err(|e| IndexError::decode(&id, e.to_string()))?,
            };
            let body = into_object(body);
            collect_paths(&body, "", &mut paths);

            let doc = self.to_tantivy(&id, body)?;
            writer.delete_term(Term::from_field_text(self.id_field, &id));
            writer
                .add_document(doc)
                .map_err(|e| IndexError::write(format!("Failed to add '{}': {}", id, e)))?;
        }

        Ok(paths)
    }

    fn to_tantivy(&self, id: &str, body: Value) -> Result<TantivyDocument, IndexError> {
        let mut text = Vec::new();
        collect_text(&body, &mut text);

        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        fields.insert(ALL_FIELD.to_string(), Value::String(text.join("\n")));
        fields.insert(BODY_FIELD.to_string(), body);

        TantivyDocument::parse_json(&self.schema, &Value::Object(fields).to_string())
            .map_err(|e| IndexError::decode(id, e.to_string()))
    }

    fn rollback(writer: &mut IndexWriter) {
        if let Err(e) = writer.rollback() {
            error!(error = %e, "Failed to roll back index writer");
        }
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        check_result_window(request)?;
        let started = Instant::now();
        let searcher = self.reader.searcher();

        let parser = QueryParser::for_index(&self.index, vec![self.all_field, self.body_field]);
        let query = parser
            .parse_query(&request.query.query)
            .map_err(|e| IndexError::invalid_query(e.to_string()))?;

        let (top_docs, total) = if request.size == 0 {
            let total = searcher
                .search(&query, &Count)
                .map_err(|e| IndexError::read(e.to_string()))?;
            (Vec::new(), total)
        } else {
            let collector = (
                TopDocs::with_limit(request.size).and_offset(request.from),
                Count,
            );
            searcher
                .search(&query, &collector)
                .map_err(|e| IndexError::read(e.to_string()))?
        };

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::read(e.to_string()))?;
            let id = doc
                .get_first(self.id_field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let fields = if request.wants_fields() {
                self.stored_body(&doc)
                    .map(|body| select_fields(body, &request.fields))
            } else {
                None
            };
            hits.push(SearchHit { id, score, fields });
        }

        Ok(SearchResponse {
            total_hits: total as u64,
            max_score: hits.first().map(|hit| hit.score).unwrap_or(0.0),
            took_ms: started.elapsed().as_millis() as u64,
            hits,
        })
    }

    fn document(&self, id: &str) -> Result<Option<Value>, IndexError> {
        let searcher = self.reader.searcher();
        let Some(doc) = self.find_by_id(&searcher, id)? else {
            return Ok(None);
        };
        Ok(self.stored_body(&doc))
    }

    fn find_by_id(
        &self,
        searcher: &Searcher,
        id: &str,
    ) -> Result<Option<TantivyDocument>, IndexError> {
        let query = TermQuery::new(
            Term::from_field_text(self.id_field, id),
            IndexRecordOption::Basic,
        );
        let top = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::read(e.to_string()))?;

        match top.first() {
            Some((_, address)) => searcher
                .doc(*address)
                .map(Some)
                .map_err(|e| IndexError::read(e.to_string())),
            None => Ok(None),
        }
    }

    /// The stored JSON body of a document.
    fn stored_body(&self, doc: &TantivyDocument) -> Option<Value> {
        let json: Value = serde_json::from_str(&doc.to_json(&self.schema)).ok()?;
        json.get(BODY_FIELD)?.get(0).cloned()
    }
}

/// Documents are indexed as JSON objects; anything else is wrapped.
fn into_object(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => {
            let mut map = Map::new();
            map.insert(WRAPPED_VALUE_KEY.to_string(), other);
            Value::Object(map)
        }
    }
}

/// Reject pages that reach past [`MAX_RESULT_WINDOW`].
fn check_result_window(request: &SearchRequest) -> Result<(), IndexError> {
    match request.from.checked_add(request.size) {
        Some(window) if window <= MAX_RESULT_WINDOW => Ok(()),
        _ => Err(IndexError::invalid_query(format!(
            "from + size must not exceed {}, got from={} size={}",
            MAX_RESULT_WINDOW, request.from, request.size
        ))),
    }
}

/// Pick the requested fields out of a stored body. `*` selects everything.
fn select_fields(body: Value, requested: &[String]) -> Value {
    if requested.iter().any(|field| field == "*") {
        return body;
    }

    let mut selected = Map::new();
    for field in requested {
        if let Some(value) = lookup_path(&body, field) {
            selected.insert(field.clone(), value.clone());
        }
    }
    Value::Object(selected)
}

#[async_trait]
impl IndexEngine for TantivyIndex {
    /// Apply the batch on the blocking pool; the writer commits once per batch.
    #[instrument(skip(self, batch), fields(count = batch.len()))]
    async fn apply_batch(&self, batch: IndexBatch) -> Result<(), IndexError> {
        if batch.is_empty() {
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.apply(batch))
            .await
            .map_err(|e| IndexError::write(format!("Index task failed: {}", e)))?
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        tokio::task::spawn_blocking(move || inner.search(&request))
            .await
            .map_err(|e| IndexError::read(format!("Search task failed: {}", e)))?
    }

    async fn fields(&self) -> Result<Vec<String>, IndexError> {
        self.inner.fields.list()
    }

    async fn document(&self, id: &str) -> Result<Option<Value>, IndexError> {
        let inner = Arc::clone(&self.inner);
        let id = id.to_string();
        tokio::task::spawn_blocking(move || inner.document(&id))
            .await
            .map_err(|e| IndexError::read(format!("Lookup task failed: {}", e)))?
    }

    async fn doc_count(&self) -> Result<u64, IndexError> {
        Ok(self.inner.reader.searcher().num_docs())
    }
}
