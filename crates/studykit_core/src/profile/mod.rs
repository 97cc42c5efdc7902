//! Profile screen model.
//!
//! # Responsibility
//! - Decode profile managers, data sources, sections and table items.
//! - Filter rows against caller-supplied cohort membership on every read.
//! - Read bound values through an explicitly passed item store.
//!
//! # See also
//! - `factory` for the tag dispatch these decoders plug into.

pub mod cohort;
pub mod manager;
pub mod section;
pub mod store;
pub mod table_item;

use crate::factory::decoder::decode_fields;
use crate::factory::registry::{
    ProfileDataSources, ProfileItems, ProfileManagers, ProfileTableItems, TypeRegistry,
};
use manager::{ProfileItemDescriptor, ProfileManager, ProfileStorage};
use section::ProfileDataSource;
use table_item::{BoundItem, HtmlItem, ProfileTableItem};

pub const TABLE_ITEM_HTML: &str = "html";
pub const TABLE_ITEM_PROFILE_ITEM: &str = "profileItem";
pub const TABLE_ITEM_RESOURCE: &str = "resource";
pub const TABLE_ITEM_STUDY_PARTICIPATION: &str = "studyParticipation";

pub const PROFILE_ITEM_USER_DEFAULTS: &str = "userDefaults";
pub const PROFILE_ITEM_KEYCHAIN: &str = "keychain";
pub const PROFILE_ITEM_HEALTH_KIT: &str = "healthKit";

pub(crate) fn register_standard(registry: &mut TypeRegistry) {
    registry.register::<ProfileTableItems, _>(TABLE_ITEM_HTML, |_, document| {
        decode_fields::<HtmlItem>(document).map(ProfileTableItem::Html)
    });
    registry.register::<ProfileTableItems, _>(TABLE_ITEM_PROFILE_ITEM, |_, document| {
        decode_fields::<BoundItem>(document).map(ProfileTableItem::Bound)
    });
    registry.reserve::<ProfileTableItems>(TABLE_ITEM_RESOURCE);
    registry.reserve::<ProfileTableItems>(TABLE_ITEM_STUDY_PARTICIPATION);

    registry.register::<ProfileItems, _>(PROFILE_ITEM_USER_DEFAULTS, |_, document| {
        ProfileItemDescriptor::decode(ProfileStorage::UserDefaults, document)
    });
    registry.register::<ProfileItems, _>(PROFILE_ITEM_KEYCHAIN, |_, document| {
        ProfileItemDescriptor::decode(ProfileStorage::Keychain, document)
    });
    registry.reserve::<ProfileItems>(PROFILE_ITEM_HEALTH_KIT);

    registry.register::<ProfileManagers, _>("default", ProfileManager::decode);
    registry.register::<ProfileDataSources, _>("default", ProfileDataSource::decode);
}
