//! Model auto-registration via the inventory crate.
//!
//! `#[derive(IndexedModel)]` submits a [`ModelRegistration`] for every
//! non-generic struct, so an application can plan (and then create) the
//! indexes of all linked models at boot time.

use crate::errors::IndexerResult;
use crate::executor::Indexer;
use crate::types::{IndexSpecification, ModelDescriptor};

/// Metadata submitted to the inventory by the derive macro.
pub struct ModelRegistration {
    /// Struct name (e.g. "User")
    pub model: &'static str,
    /// Target collection (e.g. "users")
    pub collection: &'static str,
    /// Builds the model descriptor
    pub describe: fn() -> ModelDescriptor,
}

inventory::collect!(ModelRegistration);

pub fn registered_models() -> impl Iterator<Item = &'static ModelRegistration> {
    inventory::iter::<ModelRegistration>()
}

pub fn find_model(model: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|registration| registration.model == model)
}

/// All registrations targeting `collection`, sorted by model name.
pub fn models_for_collection(collection: &str) -> Vec<&'static ModelRegistration> {
    let mut found: Vec<_> = registered_models()
        .filter(|registration| registration.collection == collection)
        .collect();
    found.sort_by_key(|registration| registration.model);
    found
}

/// Outcome of planning one registered model.
#[derive(Debug)]
pub struct PlannedModel {
    pub collection: &'static str,
    pub model: &'static str,
    pub specs: IndexerResult<Vec<IndexSpecification>>,
}

/// Plan every registered model, sorted by collection then model name.
pub fn plan_registered(indexer: &Indexer) -> Vec<PlannedModel> {
    let mut planned: Vec<PlannedModel> = registered_models()
        .map(|registration| PlannedModel {
            collection: registration.collection,
            model: registration.model,
            specs: indexer.plan(&(registration.describe)()),
        })
        .collect();
    planned.sort_by(|a, b| a.collection.cmp(b.collection).then(a.model.cmp(b.model)));
    planned
}
