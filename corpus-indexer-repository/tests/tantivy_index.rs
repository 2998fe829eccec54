use corpus_indexer_repository::{
    Analyzer, IndexEngine, IndexError, IndexMapping, TantivyIndex, MAX_RESULT_WINDOW,
};
use corpus_indexer_shared::{Document, SearchRequest};
use serde_json::{json, Value};

fn beer(id: &str, name: &str, description: &str, abv: f64) -> (String, Document) {
    (
        id.to_string(),
        Document::from_fields(
            id,
            json!({
                "type": "beer",
                "name": name,
                "description": description,
                "abv": abv,
                "brewery": {"name": format!("{} brewery", name)}
            }),
        ),
    )
}

async fn seeded_index(dir: &std::path::Path) -> TantivyIndex {
    let index = TantivyIndex::create(dir.join("beer.tantivy"), &IndexMapping::default()).unwrap();

    let mut batch = index.new_batch();
    for (id, doc) in [
        beer("shock_top", "Shock Top", "Belgian white with orange peel", 5.2),
        beer("ic_light", "IC Light", "Light lager brewed with mountain water", 4.1),
        beer("raspberry_ale", "Wild Raspberry Ale", "Pairs with spicy mexican food", 5.6),
    ] {
        batch.index(id, doc);
    }
    index.apply_batch(batch).await.unwrap();
    index
}

#[tokio::test]
async fn test_apply_batch_makes_documents_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    assert_eq!(index.doc_count().await.unwrap(), 3);

    let response = index.search(&SearchRequest::new("shock")).await.unwrap();
    assert_eq!(response.total_hits, 1);
    assert_eq!(response.hits[0].id, "shock_top");
    assert!(response.hits[0].fields.is_none());
}

#[tokio::test]
async fn test_search_returns_requested_fields() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    let request = SearchRequest::new("mexican").with_fields(vec!["name".to_string()]);
    let response = index.search(&request).await.unwrap();

    assert_eq!(response.total_hits, 1);
    assert_eq!(
        response.hits[0].fields,
        Some(json!({"name": "Wild Raspberry Ale"}))
    );
}

#[tokio::test]
async fn test_search_pages_with_size_and_from() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    let first = index
        .search(&SearchRequest::new("beer").with_size(2))
        .await
        .unwrap();
    let rest = index
        .search(&SearchRequest::new("beer").with_size(2).with_from(2))
        .await
        .unwrap();

    assert_eq!(first.total_hits, 3);
    assert_eq!(first.hits.len(), 2);
    assert_eq!(rest.hits.len(), 1);
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    let err = index
        .search(&SearchRequest::new("(shock AND"))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_oversized_pages_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    for request in [
        SearchRequest::new("shock").with_size(1usize << 40),
        SearchRequest::new("shock").with_size(usize::MAX),
        SearchRequest::new("shock").with_from(usize::MAX),
        SearchRequest::new("shock")
            .with_from(MAX_RESULT_WINDOW)
            .with_size(1),
    ] {
        let err = index.search(&request).await.unwrap_err();
        assert!(matches!(err, IndexError::InvalidQuery(_)), "{:?}", err);
    }

    let response = index
        .search(&SearchRequest::new("shock").with_size(MAX_RESULT_WINDOW))
        .await
        .unwrap();
    assert_eq!(response.total_hits, 1);
}

#[tokio::test]
async fn test_field_list_failure_does_not_reject_committed_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beer.tantivy");
    let index = TantivyIndex::create(&path, &IndexMapping::default()).unwrap();
    // A directory where the field list should go makes every write of it fail.
    std::fs::create_dir(path.join("fields.json")).unwrap();

    let mut batch = index.new_batch();
    batch.index(
        "shock_top",
        Document::from_fields("shock_top", json!({"name": "Shock Top"})),
    );
    index.apply_batch(batch).await.unwrap();

    assert_eq!(index.doc_count().await.unwrap(), 1);
    assert_eq!(
        index.document("shock_top").await.unwrap(),
        Some(json!({"name": "Shock Top"}))
    );
}

#[tokio::test]
async fn test_same_id_is_upserted() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    let mut batch = index.new_batch();
    batch.index(
        "ic_light",
        Document::from_fields("ic_light", json!({"name": "IC Light Mango"})),
    );
    index.apply_batch(batch).await.unwrap();

    assert_eq!(index.doc_count().await.unwrap(), 3);
    assert_eq!(
        index.document("ic_light").await.unwrap(),
        Some(json!({"name": "IC Light Mango"}))
    );
}

#[tokio::test]
async fn test_raw_payloads_are_decoded_by_engine() {
    let dir = tempfile::tempdir().unwrap();
    let index = TantivyIndex::create(dir.path().join("raw.tantivy"), &IndexMapping::default())
        .unwrap();

    let mut batch = index.new_batch();
    batch.index(
        "k1",
        Document::from_raw("k1", br#"{"name": "Norfolk Nog"}"#.to_vec()),
    );
    batch.index("k2", Document::from_raw("k2", b"42".to_vec()));
    index.apply_batch(batch).await.unwrap();

    assert_eq!(
        index.document("k1").await.unwrap(),
        Some(json!({"name": "Norfolk Nog"}))
    );
    assert_eq!(index.document("k2").await.unwrap(), Some(json!({"value": 42})));
}

#[tokio::test]
async fn test_bad_raw_payload_rejects_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    let index = TantivyIndex::create(dir.path().join("bad.tantivy"), &IndexMapping::default())
        .unwrap();

    let mut batch = index.new_batch();
    batch.index("good", Document::from_raw("good", br#"{"a": "b"}"#.to_vec()));
    batch.index("bad", Document::from_raw("bad", b"{not json".to_vec()));

    let err = index.apply_batch(batch).await.unwrap_err();
    assert!(matches!(err, IndexError::DecodeError { ref id, .. } if id == "bad"));
    assert_eq!(index.doc_count().await.unwrap(), 0);
    assert_eq!(index.document("good").await.unwrap(), None);
}

#[tokio::test]
async fn test_fields_lists_known_paths() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    assert_eq!(
        index.fields().await.unwrap(),
        vec!["abv", "brewery.name", "description", "name", "type"]
    );
}

#[tokio::test]
async fn test_document_missing_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let index = seeded_index(dir.path()).await;

    assert_eq!(index.document("nope").await.unwrap(), None::<Value>);
}

#[tokio::test]
async fn test_reopen_existing_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beer.tantivy");
    {
        let index = seeded_index(dir.path()).await;
        assert_eq!(index.path(), path.as_path());
    }

    let (index, created) = TantivyIndex::open_or_create(&path, &IndexMapping::default()).unwrap();
    assert!(!created);
    assert_eq!(index.doc_count().await.unwrap(), 3);
    assert_eq!(index.fields().await.unwrap().len(), 5);

    let err = TantivyIndex::create(&path, &IndexMapping::default())
        .err()
        .unwrap();
    assert!(matches!(err, IndexError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_open_or_create_creates_missing_index() {
    let dir = tempfile::tempdir().unwrap();
    let mapping = IndexMapping::with_analyzer(Analyzer::Standard);

    let (index, created) =
        TantivyIndex::open_or_create(dir.path().join("fresh.tantivy"), &mapping).unwrap();

    assert!(created);
    assert_eq!(index.doc_count().await.unwrap(), 0);
    assert!(index.fields().await.unwrap().is_empty());
}
