//! The search index: data model, codec, writer, reader, validation and the
//! filesystem build pipeline.

pub mod build;
pub mod codec;
pub mod reader;
pub mod stats;
pub mod types;
pub mod validate;
pub mod writer;

pub use reader::IndexReader;
pub use types::*;
pub use validate::{validate, Severity, ValidationReport};
pub use writer::{write_index, IndexWriter};
