//! Profile sections and the data source that groups them.
//!
//! # Invariants
//! - A section keeps the full decoded item list; callers only ever see the
//!   cohort-filtered projection, recomputed on each read.
//! - Decode failures never yield a partial data source.

use crate::factory::decoder::{decode_fields, Factory};
use crate::factory::error::DecodeResult;
use crate::factory::registry::ProfileTableItems;
use crate::profile::cohort::{visible, Membership, MembershipProvider};
use crate::profile::table_item::ProfileTableItem;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct SectionFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    items: Vec<Value>,
}

/// Titled group of profile rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSection {
    pub title: Option<String>,
    pub icon: Option<String>,
    all_items: Vec<ProfileTableItem>,
}

impl ProfileSection {
    pub fn new(title: Option<String>, icon: Option<String>, items: Vec<ProfileTableItem>) -> Self {
        Self {
            title,
            icon,
            all_items: items,
        }
    }

    /// Decodes one section; reserved item tags are dropped from `items`.
    pub fn decode(factory: &Factory, document: &Value) -> DecodeResult<Self> {
        let fields: SectionFields = decode_fields(document)?;
        let items = factory.decode_sequence::<ProfileTableItems>("items", &fields.items)?;
        Ok(Self::new(fields.title, fields.icon, items))
    }

    /// Items visible for `membership`.
    pub fn items(&self, membership: &Membership) -> Vec<&ProfileTableItem> {
        self.all_items
            .iter()
            .filter(|item| visible(*item, membership))
            .collect()
    }

    pub fn items_for(&self, provider: &dyn MembershipProvider) -> Vec<&ProfileTableItem> {
        self.items(&provider.current_membership())
    }

    /// Number of decoded items before filtering.
    pub fn decoded_len(&self) -> usize {
        self.all_items.len()
    }
}

#[derive(Deserialize)]
struct DataSourceFields {
    #[serde(default)]
    sections: Vec<Value>,
}

/// Ordered sections rendered by the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDataSource {
    sections: Vec<ProfileSection>,
}

impl ProfileDataSource {
    pub fn new(sections: Vec<ProfileSection>) -> Self {
        Self { sections }
    }

    pub(crate) fn decode(factory: &Factory, document: &Value) -> DecodeResult<Self> {
        let fields: DataSourceFields = decode_fields(document)?;
        let mut sections = Vec::with_capacity(fields.sections.len());
        for (index, section) in fields.sections.iter().enumerate() {
            sections.push(
                ProfileSection::decode(factory, section)
                    .map_err(|err| err.at(format!("sections[{index}]")))?,
            );
        }
        Ok(Self { sections })
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn sections(&self) -> &[ProfileSection] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&ProfileSection> {
        self.sections.get(index)
    }

    pub fn number_of_rows(&self, section: usize, membership: &Membership) -> usize {
        self.section(section)
            .map_or(0, |section| section.items(membership).len())
    }

    pub fn item_at(
        &self,
        section: usize,
        row: usize,
        membership: &Membership,
    ) -> Option<&ProfileTableItem> {
        self.section(section)?.items(membership).get(row).copied()
    }
}
