//! mongo-indexer core library.
//!
//! Derives MongoDB index definitions from struct field annotations and
//! creates them on a collection:
//!
//! ```ignore
//! use mongo_indexer::{IndexedModel, Indexer};
//!
//! #[derive(IndexedModel)]
//! #[mongo_index(collection = "users")]
//! struct User {
//!     #[mongo_index(key = "_id")]
//!     id: String,
//!     #[mongo_index(key = "email,omitempty", spec = "unique,asc,name=email_idx")]
//!     email: String,
//!     #[mongo_index(spec = "desc,ttl=3600")]
//!     created_at: i64,
//! }
//!
//! let names = Indexer::new().create_indexes(&collection, &User::default()).await?;
//! ```
//!
//! The annotation grammar lives in [`tag`]; field walking in [`inspector`].

extern crate self as mongo_indexer;

pub mod errors;
pub mod executor;
pub mod inspector;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod registry;
pub mod tag;
pub mod types;

pub use errors::*;
pub use executor::{IndexCollection, Indexer, IndexerConfig};
pub use inspector::{build_index_from_tag, parse_model_indexes, parse_model_indexes_with};
pub use mongo_indexer_macros::IndexedModel;
pub use registry::{ModelRegistration, PlannedModel, plan_registered, registered_models};
pub use tag::{CollectWarnings, LogWarnings, TagObserver, TagWarning, parse_tag, parse_tag_with};
pub use types::{FieldDescriptor, IndexDirection, IndexOptionSet, IndexSpecification, ModelDescriptor, ModelShape};

// The trait and the derive macro share a name, as serde's `Serialize` does.
pub use inspector::IndexedModel;

// Re-export inventory for auto-registration in the derive macro
pub use inventory;
