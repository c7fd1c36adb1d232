//! Model inspection: turns a model descriptor into ordered index specifications.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use crate::errors::{IndexerError, IndexerResult};
use crate::tag::{TagWarning, parse_tag, parse_tag_with};
use crate::types::{FieldDescriptor, IndexSpecification, ModelDescriptor, ModelShape};

/// Capability required by the inspector: describe the model's fields.
///
/// Implemented by `#[derive(IndexedModel)]` for structs, by
/// [`ModelDescriptor`] for hand-built models, and by smart pointers and
/// `Option` through delegation. Primitive types report a non-record shape so
/// the inspector can reject them.
pub trait IndexedModel {
    fn model_descriptor(&self) -> ModelDescriptor;
}

/// Inspect `model` and build one index specification per annotated field.
///
/// Fields without an index annotation are skipped. The first failing field
/// aborts the inspection; its name is attached to the returned error.
pub fn parse_model_indexes<M>(model: &M) -> IndexerResult<Vec<IndexSpecification>>
where
    M: IndexedModel + ?Sized,
{
    let descriptor = model.model_descriptor();
    let fields = record_fields(&descriptor)?;

    let mut specs = Vec::new();
    for field in fields {
        let Some(tag) = field.index_tag() else {
            continue;
        };
        let key = field.storage_key();
        log::debug!("mongoindexer: {}.{} -> key `{key}` tag `{tag}`", descriptor.name, field.name);
        let spec = build_index_from_tag(&key, tag).map_err(|err| IndexerError::in_field(&field.name, err))?;
        specs.push(spec);
    }

    Ok(specs)
}

/// Like [`parse_model_indexes`], reporting tag warnings per field to `observer`.
pub fn parse_model_indexes_with<M, F>(model: &M, mut observer: F) -> IndexerResult<Vec<IndexSpecification>>
where
    M: IndexedModel + ?Sized,
    F: FnMut(&FieldDescriptor, TagWarning),
{
    let descriptor = model.model_descriptor();
    let fields = record_fields(&descriptor)?;

    let mut specs = Vec::new();
    for field in fields {
        let Some(tag) = field.index_tag() else {
            continue;
        };
        let mut forward = |warning: TagWarning| observer(field, warning);
        let options = parse_tag_with(tag, &mut forward)
            .map_err(|err| IndexerError::in_field(&field.name, err))?;
        specs.push(IndexSpecification::new(field.storage_key(), options));
    }

    Ok(specs)
}

/// Build a single specification from a resolved key and its annotation.
pub fn build_index_from_tag(key: &str, tag: &str) -> IndexerResult<IndexSpecification> {
    let options = parse_tag(tag)?;
    Ok(IndexSpecification::new(key, options))
}

fn record_fields(descriptor: &ModelDescriptor) -> IndexerResult<&[FieldDescriptor]> {
    match descriptor.shape {
        ModelShape::Record => Ok(&descriptor.fields),
        ModelShape::Absent => Err(IndexerError::NilModel),
        shape => Err(IndexerError::InvalidModelShape { shape }),
    }
}

impl IndexedModel for ModelDescriptor {
    fn model_descriptor(&self) -> ModelDescriptor {
        self.clone()
    }
}

impl<T> IndexedModel for Option<T>
where
    T: IndexedModel,
{
    fn model_descriptor(&self) -> ModelDescriptor {
        match self {
            Some(inner) => inner.model_descriptor(),
            None => ModelDescriptor::absent(),
        }
    }
}

macro_rules! delegate_indexed_model {
    ($($pointer:ident),* $(,)?) => {
        $(
            impl<T> IndexedModel for $pointer<T>
            where
                T: IndexedModel + ?Sized,
            {
                fn model_descriptor(&self) -> ModelDescriptor {
                    (**self).model_descriptor()
                }
            }
        )*
    };
}

delegate_indexed_model!(Box, Rc, Arc);

impl<T> IndexedModel for &T
where
    T: IndexedModel + ?Sized,
{
    fn model_descriptor(&self) -> ModelDescriptor {
        (**self).model_descriptor()
    }
}

impl<T> IndexedModel for &mut T
where
    T: IndexedModel + ?Sized,
{
    fn model_descriptor(&self) -> ModelDescriptor {
        (**self).model_descriptor()
    }
}

macro_rules! scalar_indexed_model {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl IndexedModel for $ty {
                fn model_descriptor(&self) -> ModelDescriptor {
                    ModelDescriptor::of_shape($name, ModelShape::Scalar($name))
                }
            }
        )*
    };
}

scalar_indexed_model!(
    bool => "bool",
    char => "char",
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
    i128 => "int128",
    isize => "int",
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    u128 => "uint128",
    usize => "uint",
    f32 => "float32",
    f64 => "float64",
    str => "string",
    String => "string",
    () => "unit",
);

impl<T> IndexedModel for Vec<T> {
    fn model_descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::of_shape("Vec", ModelShape::Sequence)
    }
}

impl<T> IndexedModel for [T] {
    fn model_descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::of_shape("slice", ModelShape::Sequence)
    }
}

impl<K, V, S> IndexedModel for HashMap<K, V, S> {
    fn model_descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::of_shape("HashMap", ModelShape::Map)
    }
}

impl<K, V> IndexedModel for BTreeMap<K, V> {
    fn model_descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::of_shape("BTreeMap", ModelShape::Map)
    }
}
