//! LanceDB-backed persistent store.

use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{
    FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator, StringArray,
    TimestampMillisecondArray,
};
use chrono::{TimeZone, Utc};
use cityqa_core::types::{Document, Metadata, SearchResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::schema::{build_documents_schema, EMBEDDING_DIM};
use crate::SearchFilter;

pub struct LanceStore {
    db: Connection,
    table_name: String,
}

impl LanceStore {
    pub async fn open(db_dir: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_dir.to_string_lossy().as_ref()).execute().await?;
        let store = Self {
            db,
            table_name: table_name.to_string(),
        };
        store.ensure_table().await?;
        Ok(store)
    }

    async fn ensure_table(&self) -> Result<()> {
        let names = self.db.table_names().execute().await?;
        if names.contains(&self.table_name) {
            return Ok(());
        }
        // create empty table with 0 rows
        let schema = build_documents_schema();
        let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
        self.db
            .create_table(&self.table_name, Box::new(iter))
            .execute()
            .await?;
        Ok(())
    }

    pub async fn insert(&self, doc: &Document) -> Result<()> {
        if doc.embedding.len() != EMBEDDING_DIM as usize {
            return Err(anyhow!(
                "embedding length {} does not match table dimension {}",
                doc.embedding.len(),
                EMBEDDING_DIM
            ));
        }
        let batch = doc_to_record_batch(doc)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        self.db
            .open_table(&self.table_name)
            .execute()
            .await?
            .add(reader)
            .execute()
            .await?;
        Ok(())
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .query()
            .only_if(format!("id = '{}'", id.replace('\'', "''")))
            .limit(1)
            .execute()
            .await?;
        while let Some(batch) = stream.try_next().await? {
            if batch.num_rows() > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub async fn search(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut query = table
            .vector_search(vector.to_vec())?
            .distance_type(DistanceType::Cosine)
            .limit(k);
        if let Some(predicate) = filter.and_then(SearchFilter::to_predicate) {
            query = query.only_if(predicate);
        }

        let mut stream = query.execute().await?;
        let mut results = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let ids = string_column(&batch, "id")?;
            let contents = string_column(&batch, "content")?;
            let metadatas = string_column(&batch, "metadata")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow!("_distance column missing"))?;
            for i in 0..batch.num_rows() {
                results.push(SearchResult {
                    id: ids.value(i).to_string(),
                    content: contents.value(i).to_string(),
                    metadata: parse_metadata(metadatas.value(i)),
                    distance: distances.value(i),
                });
            }
        }
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    pub async fn all_documents(&self) -> Result<Vec<Document>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table.query().execute().await?;
        let mut docs = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            let ids = string_column(&batch, "id")?;
            let contents = string_column(&batch, "content")?;
            let metadatas = string_column(&batch, "metadata")?;
            let added = batch
                .column_by_name("added_at")
                .and_then(|c| c.as_any().downcast_ref::<TimestampMillisecondArray>())
                .ok_or_else(|| anyhow!("added_at column missing"))?;
            let vectors = batch
                .column_by_name("vector")
                .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
                .ok_or_else(|| anyhow!("vector column missing"))?;
            for i in 0..batch.num_rows() {
                let embedding = vectors
                    .value(i)
                    .as_primitive::<Float32Type>()
                    .values()
                    .iter()
                    .copied()
                    .collect::<Vec<f32>>();
                let created_at = Utc
                    .timestamp_millis_opt(added.value(i))
                    .single()
                    .unwrap_or_default();
                docs.push(Document {
                    id: ids.value(i).to_string(),
                    content: contents.value(i).to_string(),
                    metadata: parse_metadata(metadatas.value(i)),
                    embedding,
                    created_at,
                });
            }
        }
        Ok(docs)
    }

    pub async fn count(&self) -> Result<usize> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        Ok(table.count_rows(None).await?)
    }
}

fn doc_to_record_batch(doc: &Document) -> Result<RecordBatch> {
    let schema = build_documents_schema();
    let metadata_json = serde_json::to_string(&doc.metadata)?;
    let char_count = i32::try_from(doc.content.chars().count()).unwrap_or(i32::MAX);
    let vector: Vec<Option<Vec<Option<f32>>>> =
        vec![Some(doc.embedding.iter().map(|&x| Some(x)).collect())];

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![doc.id.clone()])),
            Arc::new(StringArray::from(vec![doc.content.clone()])),
            Arc::new(StringArray::from(vec![meta_str(&doc.metadata, "source")])),
            Arc::new(StringArray::from(vec![meta_str(&doc.metadata, "category")])),
            Arc::new(StringArray::from(vec![metadata_json])),
            Arc::new(TimestampMillisecondArray::from(vec![doc
                .created_at
                .timestamp_millis()])),
            Arc::new(Int32Array::from(vec![char_count])),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
                vector.into_iter(),
                EMBEDDING_DIM,
            )),
        ],
    )?;
    Ok(batch)
}

fn meta_str(metadata: &Metadata, key: &str) -> String {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_metadata(raw: &str) -> Metadata {
    serde_json::from_str(raw).unwrap_or_default()
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("{name} column missing"))
}
