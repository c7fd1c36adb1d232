use thiserror::Error;

use crate::tag::TagWarning;
use crate::types::ModelShape;

/// Top-level error type returned while compiling or applying index definitions.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The model descriptor was absent (`None`).
    #[error("mongoindexer: model is nil")]
    NilModel,

    /// The model is not record-shaped.
    #[error("mongoindexer: model must be a struct, got {shape}")]
    InvalidModelShape { shape: ModelShape },

    /// A `ttl=` token carried something other than a non-negative base-10 integer.
    #[error("invalid ttl value: {value}")]
    InvalidTtl { value: String },

    /// A `partial=` token carried something other than a JSON object.
    #[error("invalid partial filter expression: {0}")]
    InvalidPartialFilter(#[source] serde_json::Error),

    /// Strict mode turned a tag warning into a failure.
    #[error("strict mode rejected tag: {warning}")]
    StrictTag { warning: TagWarning },

    /// A per-field failure, annotated with the programmatic field name.
    #[error("field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<IndexerError>,
    },

    /// The collection rejected the index creation request.
    #[error("mongoindexer: create many failed for {collection}: {source}")]
    CreateIndexes {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl IndexerError {
    pub(crate) fn in_field(field: impl Into<String>, source: IndexerError) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping `Field` wrappers.
    pub fn root_cause(&self) -> &IndexerError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Programmatic name of the field that failed, if the error came from one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Convenience alias for results produced by this crate.
pub type IndexerResult<T> = Result<T, IndexerError>;
