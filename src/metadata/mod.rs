//! Entity metadata: tables, columns, relationships and value converters.
//!
//! Metadata is declared explicitly and collected into a [`Registry`], which
//! every join graph, builder and mapper reads from. Nothing here is mutated
//! after [`RegistryBuilder::build`].

pub mod converters;
mod registry;
mod table;
mod types;

pub use registry::{Cardinality, Registry, RegistryBuilder, RelationshipMetadata};
pub use table::{ColumnMetadata, Converter, TableMetadata, Transform};
pub use types::DataType;
