//! Core contracts for Rowforge.
//!
//! This crate defines the serialized schema document, the validated typed
//! table model, and the validation rules shared by the generation engine
//! and the external collaborators that produce schema documents.

pub mod document;
pub mod error;
pub mod schema;
pub mod validation;

pub use document::{ColumnRecord, DOCUMENT_VERSION, SchemaDocument};
pub use error::{Error, Result};
pub use schema::{
    Bounds, ColumnSpec, DATE_FORMAT, DataType, DefaultValue, DeferredCommand, DomainClass,
    Monotonic, TableSchema, UUID_LENGTH_SENTINEL,
};
pub use validation::validate_schema;
