//! MongoDB adapter for [`IndexCollection`].

use std::time::Duration;

use bson::Document;
use mongodb::error::ErrorKind;
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use thiserror::Error;

use crate::executor::IndexCollection;
use crate::types::IndexSpecification;

/// Server error code for `IndexAlreadyExists`.
const INDEX_ALREADY_EXISTS: i32 = 68;

/// Whether a server error code means the requested index is already in place.
///
/// `IndexOptionsConflict` (85) and `IndexKeySpecsConflict` (86) report a
/// different definition and stay fatal.
fn is_index_already_exists(code: i32) -> bool {
    code == INDEX_ALREADY_EXISTS
}

#[derive(Debug, Error)]
pub enum MongoIndexError {
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("partial filter for `{key}` is not a valid BSON document: {source}")]
    PartialFilter {
        key: String,
        #[source]
        source: bson::ser::Error,
    },
}

/// Wraps a driver collection so the indexer can create indexes on it.
#[derive(Debug, Clone)]
pub struct MongoCollection<T: Send + Sync> {
    inner: Collection<T>,
}

impl<T: Send + Sync> MongoCollection<T> {
    pub fn new(inner: Collection<T>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

impl<T: Send + Sync> From<Collection<T>> for MongoCollection<T> {
    fn from(inner: Collection<T>) -> Self {
        Self::new(inner)
    }
}

impl<T: Send + Sync> IndexCollection for MongoCollection<T> {
    type Error = MongoIndexError;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create_many(&self, specs: &[IndexSpecification]) -> Result<Vec<String>, Self::Error> {
        let models = specs.iter().map(to_index_model).collect::<Result<Vec<_>, _>>()?;
        let result = self.inner.create_indexes(models).await?;
        Ok(result.index_names)
    }

    fn index_exists_error(err: &Self::Error) -> bool {
        match err {
            MongoIndexError::Driver(err) => {
                matches!(err.kind.as_ref(), ErrorKind::Command(command) if is_index_already_exists(command.code))
            }
            MongoIndexError::PartialFilter { .. } => false,
        }
    }
}

/// Translate a specification into the driver's index request.
pub fn to_index_model(spec: &IndexSpecification) -> Result<IndexModel, MongoIndexError> {
    let mut options = IndexOptions::default();
    if spec.options.unique {
        options.unique = Some(true);
    }
    if spec.options.sparse {
        options.sparse = Some(true);
    }
    options.name = spec.options.name.clone();
    options.expire_after = spec.options.ttl_seconds.map(|seconds| Duration::from_secs(u64::from(seconds)));
    if let Some(filter) = &spec.options.partial_filter {
        let document: Document = bson::to_document(filter).map_err(|source| MongoIndexError::PartialFilter {
            key: spec.key.clone(),
            source,
        })?;
        options.partial_filter_expression = Some(document);
    }

    let mut keys = Document::new();
    keys.insert(spec.key.clone(), spec.options.direction.as_i32());

    let mut model = IndexModel::default();
    model.keys = keys;
    model.options = Some(options);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use crate::inspector::build_index_from_tag;

    #[test]
    fn translates_options() {
        let spec = build_index_from_tag("created_at", r#"desc,ttl=3600,sparse,partial={"age":{"$gt":18}}"#).unwrap();
        let model = to_index_model(&spec).unwrap();

        assert_eq!(model.keys, doc! { "created_at": -1 });
        let options = model.options.expect("options set");
        assert_eq!(options.sparse, Some(true));
        assert_eq!(options.unique, None);
        assert_eq!(options.expire_after, Some(Duration::from_secs(3600)));
        assert_eq!(options.partial_filter_expression, Some(doc! { "age": { "$gt": 18_i64 } }));
    }

    #[test]
    fn translates_name_and_unique() {
        let spec = build_index_from_tag("email", "unique,name=email_idx").unwrap();
        let model = to_index_model(&spec).unwrap();

        assert_eq!(model.keys, doc! { "email": 1 });
        let options = model.options.expect("options set");
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.name.as_deref(), Some("email_idx"));
    }

    #[test]
    fn only_identical_indexes_count_as_existing() {
        assert!(is_index_already_exists(68));
        assert!(!is_index_already_exists(85));
        assert!(!is_index_already_exists(86));
    }
}
