//! Core configuration decoding and result model for study apps.
//!
//! Turns tagged configuration documents into typed profile and task models,
//! filters profile rows by cohort membership, and encodes logging results.

pub mod config;
pub mod factory;
pub mod logging;
pub mod profile;
pub mod result;
pub mod task;

pub use config::{init_core, ConfigError, CoreConfig};
pub use factory::decoder::{decode_fields, Decoded, Factory};
pub use factory::error::{DecodeError, DecodeResult};
pub use factory::registry::{
    global_registry, install_registry, Category, DecodeFn, ProfileDataSources, ProfileItems,
    ProfileManagers, ProfileTableItems, RegistryError, Resolved, Tasks, TypeRegistry,
};
pub use factory::tag::{CategoryTag, ItemTypeTag};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use profile::cohort::{visible, CohortConstraint, CohortGated, Membership, MembershipProvider};
pub use profile::manager::{ProfileItemDescriptor, ProfileManager, ProfileStorage};
pub use profile::section::{ProfileDataSource, ProfileSection};
pub use profile::store::{InMemoryItemStore, ItemStore, ItemStoreError};
pub use profile::table_item::{
    BoundItem, HtmlItem, HtmlResource, OnSelectedAction, ProfileTableItem,
};
pub use result::answer::{Answer, AnswerResult, AnswerType, StepResult};
pub use result::tracked::{LoggingResultCollection, LoggingResultEntry};
pub use result::{EncodeError, EncodeResult};
pub use task::{GenericTask, TaskDescription, TrackedItem, TrackedItemCatalog, TrackingTask};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
