//! buddy-retrieval: Product search and catalog adapters
//!
//! Wraps the semantic search backend and the product dataset behind the
//! [`ProductSearch`] and [`ProductCatalog`] traits the dialogue graph
//! consumes.

pub mod catalog;
pub mod error;
pub mod search;

pub use catalog::{JsonlCatalog, ProductCatalog, ProductRow};
pub use error::{Error, Result};
pub use search::{ProductSearch, SearchHit, VectorSearchClient};
