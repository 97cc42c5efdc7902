//! Profile manager configuration: the catalog of profile items a store holds.

use crate::factory::decoder::{decode_fields, Factory};
use crate::factory::error::DecodeResult;
use crate::factory::registry::ProfileItems;
use serde::Deserialize;
use serde_json::Value;

/// Where a profile item value is persisted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStorage {
    UserDefaults,
    Keychain,
}

/// Declaration of one profile item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileItemDescriptor {
    pub storage: ProfileStorage,
    pub profile_key: String,
    /// Key in the backing storage, when it differs from `profile_key`.
    pub source_key: Option<String>,
    pub readonly: bool,
    pub default_value: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileItemFields {
    profile_key: String,
    #[serde(default)]
    source_key: Option<String>,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    default_value: Option<Value>,
}

impl ProfileItemDescriptor {
    pub(crate) fn decode(storage: ProfileStorage, document: &Value) -> DecodeResult<Self> {
        let fields: ProfileItemFields = decode_fields(document)?;
        Ok(Self {
            storage,
            profile_key: fields.profile_key,
            source_key: fields.source_key,
            readonly: fields.readonly,
            default_value: fields.default_value,
        })
    }

    pub fn source_key(&self) -> &str {
        self.source_key.as_deref().unwrap_or(&self.profile_key)
    }
}

#[derive(Deserialize)]
struct ProfileManagerFields {
    #[serde(default)]
    items: Vec<Value>,
}

/// Decoded profile manager configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileManager {
    items: Vec<ProfileItemDescriptor>,
}

impl ProfileManager {
    pub fn new(items: Vec<ProfileItemDescriptor>) -> Self {
        Self { items }
    }

    pub(crate) fn decode(factory: &Factory, document: &Value) -> DecodeResult<Self> {
        let fields: ProfileManagerFields = decode_fields(document)?;
        let items = factory.decode_sequence::<ProfileItems>("items", &fields.items)?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[ProfileItemDescriptor] {
        &self.items
    }

    pub fn item(&self, profile_key: &str) -> Option<&ProfileItemDescriptor> {
        self.items
            .iter()
            .find(|item| item.profile_key == profile_key)
    }
}
