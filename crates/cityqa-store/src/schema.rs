use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

pub const EMBEDDING_DIM: i32 = 384;

/// One row per document. `metadata` holds the full JSON map; `source` and
/// `category` are additionally materialized as columns so equality filters
/// can be pushed down as SQL predicates.
pub fn build_documents_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("metadata", DataType::Utf8, false),
        Field::new(
            "added_at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new("char_count", DataType::Int32, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM,
            ),
            true,
        ),
    ]))
}
