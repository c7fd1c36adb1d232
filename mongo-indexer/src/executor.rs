//! Applies compiled index specifications to a collection.

use crate::errors::{IndexerError, IndexerResult};
use crate::inspector::{IndexedModel, parse_model_indexes, parse_model_indexes_with};
use crate::tag::TagWarning;
use crate::types::{FieldDescriptor, IndexSpecification};

/// The subset of a collection handle the indexer needs.
///
/// Kept small so tests can provide an in-memory implementation.
#[allow(async_fn_in_trait)]
pub trait IndexCollection {
    type Error: std::error::Error + Send + Sync + 'static;

    fn name(&self) -> &str;

    /// Create all indexes in one request, returning the created index names.
    async fn create_many(&self, specs: &[IndexSpecification]) -> Result<Vec<String>, Self::Error>;

    /// Whether `err` only reports that an identical index already exists.
    ///
    /// Conflicting definitions (same key with other options, or another
    /// name) must not match. Defaults to `false`.
    fn index_exists_error(_err: &Self::Error) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Reject annotations that produce tag warnings (unknown tokens,
    /// conflicting directions, repeated options).
    pub strict: bool,
}

/// Inspects models and creates their indexes on a collection.
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    config: IndexerConfig,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Compile `model` into index specifications honoring the configuration.
    pub fn plan<M>(&self, model: &M) -> IndexerResult<Vec<IndexSpecification>>
    where
        M: IndexedModel + ?Sized,
    {
        if !self.config.strict {
            return parse_model_indexes(model);
        }
        self.plan_with(model, |_, _| {})
    }

    /// Like [`Indexer::plan`], forwarding every tag warning to `observer`.
    ///
    /// In strict mode the first warning still fails the model, after the
    /// whole model has been observed.
    pub fn plan_with<M, F>(&self, model: &M, mut observer: F) -> IndexerResult<Vec<IndexSpecification>>
    where
        M: IndexedModel + ?Sized,
        F: FnMut(&FieldDescriptor, TagWarning),
    {
        let strict = self.config.strict;
        let mut rejected = None;
        let specs = parse_model_indexes_with(model, |field, warning| {
            if strict && rejected.is_none() {
                rejected = Some(IndexerError::in_field(
                    &field.name,
                    IndexerError::StrictTag {
                        warning: warning.clone(),
                    },
                ));
            }
            observer(field, warning);
        })?;
        match rejected {
            Some(err) => Err(err),
            None => Ok(specs),
        }
    }

    /// Inspect `model` and create its indexes on `collection`.
    ///
    /// Returns the created index names; empty when the model has no
    /// annotated fields, in which case the collection is not contacted.
    pub async fn create_indexes<C, M>(&self, collection: &C, model: &M) -> IndexerResult<Vec<String>>
    where
        C: IndexCollection,
        M: IndexedModel + ?Sized,
    {
        let specs = self.plan(model)?;
        if specs.is_empty() {
            log::debug!("mongoindexer: no indexes declared for {}", collection.name());
            return Ok(Vec::new());
        }

        match collection.create_many(&specs).await {
            Ok(names) => {
                log::info!("mongoindexer: created indexes for {}: {names:?}", collection.name());
                Ok(names)
            }
            Err(err) if C::index_exists_error(&err) => {
                let names: Vec<String> = specs.iter().map(IndexSpecification::index_name).collect();
                log::warn!(
                    "mongoindexer: identical indexes already present on {}: {names:?} ({err})",
                    collection.name()
                );
                Ok(names)
            }
            Err(err) => Err(IndexerError::CreateIndexes {
                collection: collection.name().to_string(),
                source: Box::new(err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct PlainError(String);

    struct PlainCollection;

    impl IndexCollection for PlainCollection {
        type Error = PlainError;

        fn name(&self) -> &str {
            "plain"
        }

        async fn create_many(&self, _specs: &[IndexSpecification]) -> Result<Vec<String>, Self::Error> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn default_hook_never_swallows_errors() {
        let conflict = PlainError("Index already exists with a different name: email_1".to_string());
        assert!(!PlainCollection::index_exists_error(&conflict));
    }

    #[test]
    fn plan_with_observes_warnings_in_both_modes() {
        let model = crate::types::ModelDescriptor::record("Order")
            .field(FieldDescriptor::new("Total").index("asc,clustered,desc"));

        let mut seen = Vec::new();
        let specs = Indexer::new().plan_with(&model, |field, warning| seen.push((field.name.clone(), warning))).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(seen.len(), 2);

        let mut strict_seen = 0;
        let strict = Indexer::with_config(IndexerConfig { strict: true });
        let err = strict.plan_with(&model, |_, _| strict_seen += 1).unwrap_err();
        assert_eq!(err.field(), Some("Total"));
        assert_eq!(strict_seen, 2);
    }
}
