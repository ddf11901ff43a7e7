//! The retrieval orchestrator.
//!
//! `RagEngine::bootstrap` performs the one capability-detection pass: it
//! tries to load the embedding model, tries to open the persistent store,
//! records what it got in a [`Capabilities`] value, and seeds the fixed
//! knowledge base. After that every strategy is fixed for the engine's
//! lifetime. `add`/`search`/`ask` never return errors: each collaborator
//! failure has a defined degraded result.

use chrono::Utc;
use cityqa_core::traits::AnswerGenerator;
use cityqa_core::types::{
    content_id, AskResponse, Capabilities, DocId, Document, Metadata, SearchResult, Statistics,
};
use cityqa_embed::EmbeddingProvider;
use cityqa_store::{DocumentStore, SearchFilter};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::ingest;
use crate::seed;
use crate::synthesize::synthesize;

/// `AskResponse.method` tag for answers produced by this engine.
pub const RAG_METHOD: &str = "rag_retrieval";

/// Everything `bootstrap` needs to select its strategies.
pub struct EngineOptions {
    pub db_dir: PathBuf,
    pub collection: String,
    pub model_dir: Option<PathBuf>,
    pub model_name: String,
    pub dimension: usize,
    pub default_k: usize,
    pub generator: Option<Box<dyn AnswerGenerator>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            db_dir: PathBuf::from("./data/cityqa_db"),
            collection: "city_documents".to_string(),
            model_dir: None,
            model_name: "all-MiniLM-L6-v2".to_string(),
            dimension: cityqa_embed::DEFAULT_DIMENSION,
            default_k: 5,
            generator: None,
        }
    }
}

pub struct RagEngine {
    embedder: EmbeddingProvider,
    store: DocumentStore,
    generator: Option<Box<dyn AnswerGenerator>>,
    capabilities: Capabilities,
    default_k: usize,
}

impl RagEngine {
    /// Detect capabilities, fix the strategies, seed the knowledge base.
    ///
    /// Never fails: an unloadable model means hashed embeddings, an
    /// unopenable store means the in-memory backend, both for the process
    /// lifetime.
    pub async fn bootstrap(options: EngineOptions) -> Self {
        let embedder = EmbeddingProvider::detect(
            options.model_dir.as_deref(),
            &options.model_name,
            options.dimension,
        );

        let store = match DocumentStore::open_persistent(&options.db_dir, &options.collection)
            .await
        {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    error = %e,
                    db_dir = %options.db_dir.display(),
                    "persistent store unavailable, in-memory backend for the process lifetime"
                );
                DocumentStore::in_memory(&options.collection)
            }
        };

        let capabilities = Capabilities {
            model_embedding: embedder.has_model(),
            persistent_store: store.is_persistent(),
            external_generation: options.generator.is_some(),
        };
        info!(
            model_embedding = capabilities.model_embedding,
            persistent_store = capabilities.persistent_store,
            external_generation = capabilities.external_generation,
            collection = store.collection(),
            "capabilities detected"
        );

        let engine = Self {
            embedder,
            store,
            generator: options.generator,
            capabilities,
            default_k: options.default_k,
        };
        let seeded = engine.seed_knowledge_base().await;
        info!(
            seeded,
            total = seed::SEED_DOCUMENTS.len(),
            "knowledge base ready"
        );
        engine
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Ingest the fixed seed set through the idempotent `add` path. Returns
    /// how many documents were newly stored.
    async fn seed_knowledge_base(&self) -> usize {
        let mut seeded = 0;
        for seed_doc in &seed::SEED_DOCUMENTS {
            let id = content_id(seed_doc.content);
            match self.store.exists(&id).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "seed existence check failed, skipping document");
                    continue;
                }
            }
            self.add(seed_doc.content, seed_doc.metadata()).await;
            seeded += 1;
        }
        seeded
    }

    /// Add a document. Content-addressed and idempotent: re-adding existing
    /// content returns the same id without touching the store. Persistence
    /// failures are logged, never surfaced.
    pub async fn add(&self, content: &str, metadata: Metadata) -> DocId {
        let id = content_id(content);
        match self.store.exists(&id).await {
            Ok(true) => {
                debug!(id = %&id[..8], "document already stored");
                return id;
            }
            Ok(false) => {}
            Err(e) => {
                // Inserting blind could duplicate rows, so skip instead.
                warn!(error = %e, id = %&id[..8], "existence check failed, skipping insert");
                return id;
            }
        }

        let embedding = self.embedder.embed(content);
        let doc = Document::new(content.to_string(), metadata, embedding);
        match self.store.insert(doc).await {
            Ok(()) => debug!(id = %&id[..8], "document stored"),
            Err(e) => warn!(error = %e, id = %&id[..8], "failed to persist document"),
        }
        id
    }

    /// Top-`k` documents for `query`, ascending by cosine distance. A
    /// backend failure degrades to an empty result.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&SearchFilter>,
    ) -> Vec<SearchResult> {
        let vector = self.embedder.embed(query);
        match self.store.query(&vector, k, filter).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "search degraded to empty results");
                Vec::new()
            }
        }
    }

    /// Retrieve, synthesize, respond. `sources` carries the exact ranked
    /// sequence the synthesizer consumed.
    pub async fn ask(&self, question: &str, use_generation: bool) -> AskResponse {
        let sources = self.search(question, self.default_k, None).await;
        let generator = if use_generation {
            self.generator.as_deref()
        } else {
            None
        };
        let answer = synthesize(question, &sources, generator);
        AskResponse {
            question: question.to_string(),
            answer,
            sources,
            timestamp: Utc::now(),
            method: RAG_METHOD.to_string(),
        }
    }

    /// Read-only aggregate over the store. Documents without a `category`
    /// count under `"uncategorized"`.
    pub async fn statistics(&self) -> Statistics {
        let total_documents = match self.store.count().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "document count failed");
                0
            }
        };

        let mut categories = BTreeMap::new();
        match self.store.all_documents().await {
            Ok(docs) => {
                for doc in docs {
                    let category = doc
                        .metadata
                        .get("category")
                        .and_then(Value::as_str)
                        .unwrap_or("uncategorized");
                    *categories.entry(category.to_string()).or_insert(0) += 1;
                }
            }
            Err(e) => warn!(error = %e, "category aggregation failed"),
        }

        Statistics {
            total_documents,
            collection_name: self.store.collection().to_string(),
            embedding_model: self.embedder.model_name().to_string(),
            backend_name: self.store.backend_name().to_string(),
            categories,
        }
    }

    /// Add a plain-text file as one document.
    pub async fn add_text_file(&self, path: &Path) -> anyhow::Result<DocId> {
        let (content, metadata) = ingest::text_file_entry(path)?;
        let id = self.add(&content, metadata).await;
        info!(path = %path.display(), "added text file");
        Ok(id)
    }

    /// Add a PDF, one document per non-blank page.
    pub async fn add_pdf(&self, path: &Path) -> anyhow::Result<Vec<DocId>> {
        let entries = ingest::pdf_entries(path)?;
        let mut ids = Vec::with_capacity(entries.len());
        for (content, metadata) in entries {
            ids.push(self.add(&content, metadata).await);
        }
        info!(pages = ids.len(), path = %path.display(), "added PDF");
        Ok(ids)
    }

    /// Add every `.txt`/`.md` file under `dir`.
    pub async fn add_directory(&self, dir: &Path) -> anyhow::Result<Vec<DocId>> {
        let files = ingest::directory_files(dir)?;
        let mut ids = Vec::with_capacity(files.len());
        for file in &files {
            ids.push(self.add_text_file(file).await?);
        }
        Ok(ids)
    }
}
