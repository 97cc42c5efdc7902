//! Tag-to-decoder registry per category.
//!
//! # Responsibility
//! - Map `(category, tag)` to a decode function producing that category's type.
//! - Mark tags as reserved: known, but deliberately without a decoder.
//! - Hold the process-wide registry behind a populate-once-then-freeze cell.
//!
//! # Invariants
//! - Last registration for a given `(category, tag)` wins.
//! - The global registry is immutable once installed; lookups need no locking.

use crate::factory::decoder::Factory;
use crate::factory::error::DecodeResult;
use crate::factory::tag::{
    ItemTypeTag, CATEGORY_PROFILE_DATA_SOURCE, CATEGORY_PROFILE_ITEM, CATEGORY_PROFILE_MANAGER,
    CATEGORY_PROFILE_TABLE_ITEM, CATEGORY_TASK,
};
use crate::profile::manager::{ProfileItemDescriptor, ProfileManager};
use crate::profile::section::ProfileDataSource;
use crate::profile::table_item::ProfileTableItem;
use crate::task::TaskDescription;
use log::info;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Decode strategy for one registered tag.
pub type DecodeFn<T> = Arc<dyn Fn(&Factory, &Value) -> DecodeResult<T> + Send + Sync>;

static GLOBAL_REGISTRY: OnceCell<Arc<TypeRegistry>> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no {category} decoder registered for `{tag}`")]
    NotFound {
        category: &'static str,
        tag: ItemTypeTag,
    },
    #[error("type registry already installed")]
    AlreadyInstalled,
}

/// A decode category and the value type its decoders produce.
pub trait Category: 'static {
    type Output;

    /// Wire name of the category.
    const NAME: &'static str;
    /// Tag used when a category document carries no nested `type`.
    const DEFAULT_TAG: &'static str;

    fn table(registry: &TypeRegistry) -> &DecoderTable<Self::Output>;
    fn table_mut(registry: &mut TypeRegistry) -> &mut DecoderTable<Self::Output>;
}

macro_rules! category {
    ($(#[$meta:meta])* $name:ident, $output:ty, $wire:expr, $default:expr, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Category for $name {
            type Output = $output;
            const NAME: &'static str = $wire;
            const DEFAULT_TAG: &'static str = $default;

            fn table(registry: &TypeRegistry) -> &DecoderTable<Self::Output> {
                &registry.$field
            }

            fn table_mut(registry: &mut TypeRegistry) -> &mut DecoderTable<Self::Output> {
                &mut registry.$field
            }
        }
    };
}

category!(
    /// Task-like configurations.
    Tasks, TaskDescription, CATEGORY_TASK, "generic", tasks
);
category!(
    /// Profile item descriptors held by a profile manager.
    ProfileItems, ProfileItemDescriptor, CATEGORY_PROFILE_ITEM, "userDefaults", profile_items
);
category!(
    /// Rows of a profile section.
    ProfileTableItems, ProfileTableItem, CATEGORY_PROFILE_TABLE_ITEM, "profileItem", table_items
);
category!(
    ProfileManagers, ProfileManager, CATEGORY_PROFILE_MANAGER, "default", managers
);
category!(
    ProfileDataSources, ProfileDataSource, CATEGORY_PROFILE_DATA_SOURCE, "default", data_sources
);

enum Entry<T> {
    Decoder(DecodeFn<T>),
    Reserved,
}

/// Resolution outcome for a tag that is known to the registry.
pub enum Resolved<'a, T> {
    Decoder(&'a DecodeFn<T>),
    Reserved,
}

/// Decoders registered for one category.
pub struct DecoderTable<T> {
    entries: BTreeMap<ItemTypeTag, Entry<T>>,
}

impl<T> Default for DecoderTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> DecoderTable<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns sorted registered tags, reserved ones included.
    pub fn tags(&self) -> Vec<ItemTypeTag> {
        self.entries.keys().cloned().collect()
    }
}

/// Registry of decode strategies for every category.
#[derive(Default)]
pub struct TypeRegistry {
    tasks: DecoderTable<TaskDescription>,
    profile_items: DecoderTable<ProfileItemDescriptor>,
    table_items: DecoderTable<ProfileTableItem>,
    managers: DecoderTable<ProfileManager>,
    data_sources: DecoderTable<ProfileDataSource>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding all standard variants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::task::register_standard(&mut registry);
        crate::profile::register_standard(&mut registry);
        registry
    }

    /// Registers (or replaces) the decoder for one tag.
    pub fn register<C, F>(&mut self, tag: impl Into<ItemTypeTag>, decode: F)
    where
        C: Category,
        F: Fn(&Factory, &Value) -> DecodeResult<C::Output> + Send + Sync + 'static,
    {
        C::table_mut(self)
            .entries
            .insert(tag.into(), Entry::Decoder(Arc::new(decode)));
    }

    /// Marks a tag as known but intentionally undecodable.
    pub fn reserve<C: Category>(&mut self, tag: impl Into<ItemTypeTag>) {
        C::table_mut(self).entries.insert(tag.into(), Entry::Reserved);
    }

    pub fn resolve<C: Category>(
        &self,
        tag: &ItemTypeTag,
    ) -> Result<Resolved<'_, C::Output>, RegistryError> {
        match C::table(self).entries.get(tag) {
            Some(Entry::Decoder(decode)) => Ok(Resolved::Decoder(decode)),
            Some(Entry::Reserved) => Ok(Resolved::Reserved),
            None => Err(RegistryError::NotFound {
                category: C::NAME,
                tag: tag.clone(),
            }),
        }
    }

    pub fn table<C: Category>(&self) -> &DecoderTable<C::Output> {
        C::table(self)
    }
}

/// Freezes `registry` as the process-wide registry.
///
/// Must run before the first call to [`global_registry`]; afterwards the
/// registry can no longer be replaced.
pub fn install_registry(registry: TypeRegistry) -> Result<(), RegistryError> {
    GLOBAL_REGISTRY
        .set(Arc::new(registry))
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    info!("event=registry_install module=factory status=ok source=host");
    Ok(())
}

/// Returns the process-wide registry, freezing the standard one if none was
/// installed yet.
pub fn global_registry() -> Arc<TypeRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| {
            info!("event=registry_install module=factory status=ok source=standard");
            Arc::new(TypeRegistry::standard())
        })
        .clone()
}

/// Whether the process-wide registry has been frozen.
pub fn registry_installed() -> bool {
    GLOBAL_REGISTRY.get().is_some()
}
