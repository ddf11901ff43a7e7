//! Retrieval-augmented question answering over the city knowledge base.
//!
//! The [`engine::RagEngine`] is the façade the application talks to: it
//! detects which collaborators are available once at bootstrap, seeds the
//! fixed knowledge base idempotently, and exposes `add`/`search`/`ask`/
//! `statistics`. Answer text comes out of [`synthesize`], either as a
//! template composition over the retrieved passages or via an optional
//! external generator that degrades back to the template on any error.

pub mod engine;
pub mod ingest;
pub mod seed;
pub mod synthesize;

pub use engine::{EngineOptions, RagEngine};
