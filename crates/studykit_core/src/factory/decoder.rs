//! Polymorphic document decoder.
//!
//! # Responsibility
//! - Read the outer `catType` discriminator and dispatch to a category.
//! - Read the nested `type` discriminator and dispatch through the registry.
//! - Decode sequences of tagged documents, omitting reserved tags.
//!
//! # Invariants
//! - A missing `catType` is equivalent to `catType: "task"`.
//! - A missing nested `type` is an error for items, but falls back to the
//!   category default for category-level documents.
//! - Unknown tags abort the enclosing decode; reserved tags inside a sequence
//!   are logged and skipped.

use crate::factory::error::{DecodeError, DecodeResult};
use crate::factory::registry::{
    global_registry, Category, ProfileDataSources, ProfileManagers, Resolved, Tasks, TypeRegistry,
};
use crate::factory::tag::{
    CategoryTag, ItemTypeTag, CATEGORY_FIELD, CATEGORY_PROFILE_DATA_SOURCE,
    CATEGORY_PROFILE_MANAGER, CATEGORY_TASK, TYPE_FIELD,
};
use crate::profile::manager::ProfileManager;
use crate::profile::section::ProfileDataSource;
use crate::task::TaskDescription;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Value produced by a category-level decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Task(TaskDescription),
    ProfileManager(ProfileManager),
    ProfileDataSource(ProfileDataSource),
}

/// Decoder front-end bound to one registry.
#[derive(Clone)]
pub struct Factory {
    registry: Arc<TypeRegistry>,
}

impl Factory {
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Factory over a private standard registry.
    pub fn standard() -> Self {
        Self::new(TypeRegistry::standard())
    }

    /// Factory over the process-wide registry.
    pub fn global() -> Self {
        Self::with_registry(global_registry())
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Parses bytes and decodes them as a category-tagged document.
    pub fn decode_category_slice(&self, bytes: &[u8]) -> DecodeResult<(CategoryTag, Decoded)> {
        let document: Value = serde_json::from_slice(bytes).map_err(DecodeError::Syntax)?;
        self.decode_category(&document)
    }

    /// Decodes a category-tagged document.
    pub fn decode_category(&self, document: &Value) -> DecodeResult<(CategoryTag, Decoded)> {
        let category = match document.get(CATEGORY_FIELD) {
            None | Some(Value::Null) => CategoryTag::default_category(),
            Some(Value::String(value)) => CategoryTag::new(value.as_str()),
            Some(other) => {
                return Err(wrong_discriminator_type(CATEGORY_FIELD, other));
            }
        };

        let decoded = match category.as_str() {
            CATEGORY_TASK => Decoded::Task(self.decode_variant::<Tasks>(document)?),
            CATEGORY_PROFILE_MANAGER => {
                Decoded::ProfileManager(self.decode_variant::<ProfileManagers>(document)?)
            }
            CATEGORY_PROFILE_DATA_SOURCE => {
                Decoded::ProfileDataSource(self.decode_variant::<ProfileDataSources>(document)?)
            }
            _ => {
                error!(
                    "event=decode_category module=factory status=error reason=unsupported category={}",
                    category
                );
                return Err(DecodeError::UnsupportedCategory(category));
            }
        };

        debug!(
            "event=decode_category module=factory status=ok category={}",
            category
        );
        Ok((category, decoded))
    }

    /// Decodes one item-tagged document for category `C`.
    ///
    /// Returns `Ok(None)` when the tag is reserved for `C`.
    pub fn decode_item<C: Category>(&self, document: &Value) -> DecodeResult<Option<C::Output>> {
        let tag = match document.get(TYPE_FIELD) {
            Some(Value::String(value)) => ItemTypeTag::new(value.as_str()),
            None | Some(Value::Null) => {
                return Err(DecodeError::MissingDiscriminator {
                    field: TYPE_FIELD,
                    path: String::new(),
                });
            }
            Some(other) => return Err(wrong_discriminator_type(TYPE_FIELD, other)),
        };
        self.decode_tagged::<C>(&tag, document)
    }

    /// Decodes a sequence of item-tagged documents found under `field`.
    ///
    /// Reserved tags are omitted; any other failure aborts the whole sequence.
    pub fn decode_sequence<C: Category>(
        &self,
        field: &str,
        documents: &[Value],
    ) -> DecodeResult<Vec<C::Output>> {
        let mut decoded = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            let item = self
                .decode_item::<C>(document)
                .map_err(|err| err.at(format!("{field}[{index}]")))?;
            if let Some(item) = item {
                decoded.push(item);
            }
        }
        Ok(decoded)
    }

    /// Decodes a category-level document whose nested `type` is optional.
    pub fn decode_variant<C: Category>(&self, document: &Value) -> DecodeResult<C::Output> {
        let tag = match document.get(TYPE_FIELD) {
            Some(Value::String(value)) => ItemTypeTag::new(value.as_str()),
            None | Some(Value::Null) => ItemTypeTag::new(C::DEFAULT_TAG),
            Some(other) => return Err(wrong_discriminator_type(TYPE_FIELD, other)),
        };
        match self.decode_tagged::<C>(&tag, document)? {
            Some(value) => Ok(value),
            None => Err(DecodeError::ReservedType {
                category: C::NAME,
                tag,
            }),
        }
    }

    fn decode_tagged<C: Category>(
        &self,
        tag: &ItemTypeTag,
        document: &Value,
    ) -> DecodeResult<Option<C::Output>> {
        match self.registry.resolve::<C>(tag) {
            Ok(Resolved::Decoder(decode)) => decode(self, document).map(Some),
            Ok(Resolved::Reserved) => {
                warn!(
                    "event=decode_item module=factory status=skip reason=reserved category={} tag={}",
                    C::NAME,
                    tag
                );
                Ok(None)
            }
            Err(_) => {
                error!(
                    "event=decode_item module=factory status=error reason=unknown_type category={} tag={}",
                    C::NAME,
                    tag
                );
                Err(DecodeError::UnknownItemType {
                    category: C::NAME,
                    tag: tag.clone(),
                    path: String::new(),
                })
            }
        }
    }
}

/// Decodes the plain fields of `document` into `T`.
pub fn decode_fields<T: DeserializeOwned>(document: &Value) -> DecodeResult<T> {
    serde_path_to_error::deserialize(document).map_err(DecodeError::from_path_error)
}

fn wrong_discriminator_type(field: &'static str, found: &Value) -> DecodeError {
    let message = format!("discriminator must be a string, found {}", json_kind(found));
    DecodeError::field(<serde_json::Error as serde::de::Error>::custom(message)).at(field)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
