//! Discriminator tag newtypes.
//!
//! # Invariants
//! - Construction from any string is total; tags are never validated.
//! - Equality is plain string equality.
//! - An unrecognized tag is a valid value that simply has no decoder.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! string_tag {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_tag!(
    /// Outer document category (`catType`).
    CategoryTag
);

string_tag!(
    /// Nested variant discriminator (`type`) within a category.
    ItemTypeTag
);

/// Wire field holding the outer category discriminator.
pub const CATEGORY_FIELD: &str = "catType";
/// Wire field holding the nested variant discriminator.
pub const TYPE_FIELD: &str = "type";

pub const CATEGORY_TASK: &str = "task";
pub const CATEGORY_PROFILE_ITEM: &str = "profileItem";
pub const CATEGORY_PROFILE_TABLE_ITEM: &str = "profileTableItem";
pub const CATEGORY_PROFILE_MANAGER: &str = "profileManager";
pub const CATEGORY_PROFILE_DATA_SOURCE: &str = "profileDataSource";

impl CategoryTag {
    /// Category assumed when a document carries no `catType`.
    pub fn default_category() -> Self {
        Self::new(CATEGORY_TASK)
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryTag, ItemTypeTag, CATEGORY_TASK};

    #[test]
    fn construction_is_total_and_compares_by_string() {
        let tag = ItemTypeTag::from("notRegisteredAnywhere");
        assert_eq!(tag, "notRegisteredAnywhere");
        assert_eq!(tag, ItemTypeTag::new(String::from("notRegisteredAnywhere")));
        assert_ne!(tag, ItemTypeTag::from("html"));
        assert_eq!(ItemTypeTag::from("").as_str(), "");
    }

    #[test]
    fn default_category_is_task() {
        assert_eq!(CategoryTag::default_category(), CATEGORY_TASK);
    }

    #[test]
    fn serializes_as_bare_string() {
        let json = serde_json::to_value(CategoryTag::from("profileManager")).unwrap();
        assert_eq!(json, serde_json::json!("profileManager"));
    }
}
