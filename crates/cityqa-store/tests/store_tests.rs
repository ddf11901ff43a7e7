use cityqa_core::types::{Document, Metadata};
use cityqa_embed::hashed::HashedEmbedder;
use cityqa_store::memory::{cosine_similarity, MemoryStore};
use cityqa_store::{DocumentStore, SearchFilter};
use serde_json::Value;

fn doc(content: &str, category: &str, embedding: Vec<f32>) -> Document {
    let mut meta = Metadata::new();
    meta.insert("source".to_string(), Value::from("test"));
    meta.insert("category".to_string(), Value::from(category));
    Document::new(content.to_string(), meta, embedding)
}

#[test]
fn cosine_edge_cases() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    // Zero vectors never divide by zero
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    // Length mismatch is defined, not a panic
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
}

#[test]
fn memory_search_orders_and_truncates() {
    let store = MemoryStore::new();
    store.insert(doc("exact", "a", vec![1.0, 0.0]));
    store.insert(doc("close", "a", vec![0.6, 0.8]));
    store.insert(doc("orthogonal", "b", vec![0.0, 1.0]));

    let results = store.search(&[1.0, 0.0], 5, None);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].content, "exact");
    assert!(results[0].distance.abs() < 1e-6);
    assert!(results[0].distance <= results[1].distance);
    assert!(results[1].distance <= results[2].distance);
    assert!((results[2].distance - 1.0).abs() < 1e-6, "orthogonal is distance 1");

    let truncated = store.search(&[1.0, 0.0], 2, None);
    assert_eq!(truncated.len(), 2);
}

#[test]
fn memory_search_ties_keep_insertion_order() {
    let store = MemoryStore::new();
    store.insert(doc("first in", "a", vec![1.0, 0.0]));
    store.insert(doc("second in", "a", vec![1.0, 0.0]));

    let results = store.search(&[1.0, 0.0], 5, None);
    assert_eq!(results[0].content, "first in");
    assert_eq!(results[1].content, "second in");
}

#[test]
fn memory_zero_vector_document_ranks_last() {
    let store = MemoryStore::new();
    store.insert(doc("unembedded", "a", vec![0.0, 0.0]));
    store.insert(doc("aligned", "a", vec![1.0, 0.0]));

    let results = store.search(&[1.0, 0.0], 5, None);
    assert_eq!(results[0].content, "aligned");
    assert!((results[1].distance - 1.0).abs() < 1e-6, "zero norm means similarity 0");
}

#[test]
fn memory_ignores_filters() {
    let store = MemoryStore::new();
    store.insert(doc("only doc", "a", vec![1.0, 0.0]));

    let filter = SearchFilter::new("category", "no-such-category");
    let results = store.search(&[1.0, 0.0], 5, Some(&filter));
    assert_eq!(results.len(), 1, "filter is a no-op on this backend");
}

#[tokio::test]
async fn lance_insert_exists_count_roundtrip() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashedEmbedder::new(384);
    let store = DocumentStore::open_persistent(tmp.path(), "documents").await?;
    assert!(store.is_persistent());
    assert_eq!(store.backend_name(), "lancedb");
    assert_eq!(store.count().await?, 0);

    let beach = doc(
        "Revere Beach is America's first public beach.",
        "tourism",
        embedder.embed("Revere Beach is America's first public beach."),
    );
    let beach_id = beach.id.clone();
    store.insert(beach).await?;
    store
        .insert(doc(
            "The Blue Line runs to Wonderland.",
            "transit",
            embedder.embed("The Blue Line runs to Wonderland."),
        ))
        .await?;

    assert_eq!(store.count().await?, 2);
    assert!(store.exists(&beach_id).await?);
    assert!(!store.exists("0000000000").await?);

    let docs = store.all_documents().await?;
    assert_eq!(docs.len(), 2);
    let stored = docs
        .iter()
        .find(|d| d.id == beach_id)
        .expect("beach doc present");
    assert_eq!(
        stored.metadata.get("category").and_then(Value::as_str),
        Some("tourism"),
        "metadata round-trips through the table"
    );
    assert!(stored.metadata.contains_key("added_at"));
    assert_eq!(stored.embedding.len(), 384);
    Ok(())
}

#[tokio::test]
async fn lance_query_ranks_by_distance() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashedEmbedder::new(384);
    let store = DocumentStore::open_persistent(tmp.path(), "documents").await?;

    for content in ["alpha passage", "beta passage", "gamma passage"] {
        store
            .insert(doc(content, "test", embedder.embed(content)))
            .await?;
    }

    let query = embedder.embed("beta passage");
    let results = store.query(&query, 2, None).await?;
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].content, "beta passage",
        "identical vector is the nearest neighbor"
    );
    assert!(results[0].distance < 1e-3);
    assert!(results[0].distance <= results[1].distance);
    Ok(())
}

#[tokio::test]
async fn lance_pushes_down_category_filter() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashedEmbedder::new(384);
    let store = DocumentStore::open_persistent(tmp.path(), "documents").await?;

    store
        .insert(doc("beach info", "tourism", embedder.embed("beach info")))
        .await?;
    store
        .insert(doc("train info", "transit", embedder.embed("train info")))
        .await?;

    let query = embedder.embed("beach info");
    let filter = SearchFilter::new("category", "transit");
    let results = store.query(&query, 5, Some(&filter)).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].metadata.get("category").and_then(Value::as_str),
        Some("transit")
    );
    Ok(())
}

#[tokio::test]
async fn lance_query_on_empty_table_is_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = DocumentStore::open_persistent(tmp.path(), "documents").await?;
    let results = store.query(&vec![0.5f32; 384], 5, None).await?;
    assert!(results.is_empty());
    Ok(())
}

#[tokio::test]
async fn lance_store_survives_reopen() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashedEmbedder::new(384);
    let content = "City Hall is at 281 Broadway.";
    let id = {
        let store = DocumentStore::open_persistent(tmp.path(), "documents").await?;
        let d = doc(content, "government", embedder.embed(content));
        let id = d.id.clone();
        store.insert(d).await?;
        id
    };

    let reopened = DocumentStore::open_persistent(tmp.path(), "documents").await?;
    assert_eq!(reopened.count().await?, 1);
    assert!(reopened.exists(&id).await?);
    Ok(())
}
