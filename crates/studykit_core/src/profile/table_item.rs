//! Profile table item variants.
//!
//! # Invariants
//! - HTML items are never editable and always select `showHTML`.
//! - Bound items store only the key; `detail`/`value` are read through the
//!   item store at access time.
//! - A bound item whose key is read-only in the store is never editable.

use crate::profile::cohort::{CohortConstraint, CohortGated};
use crate::profile::store::ItemStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const ACTION_NO_ACTION: &str = "noAction";
pub const ACTION_EDIT_PROFILE_ITEM: &str = "editProfileItem";
pub const ACTION_SHOW_HTML: &str = "showHTML";
pub const ACTION_SHOW_WITHDRAWAL: &str = "showWithdrawal";

/// What the presentation layer does when a row is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OnSelectedAction {
    NoAction,
    EditProfileItem,
    ShowHtml,
    ShowWithdrawal,
    /// Host-defined action name.
    Custom(String),
}

impl OnSelectedAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoAction => ACTION_NO_ACTION,
            Self::EditProfileItem => ACTION_EDIT_PROFILE_ITEM,
            Self::ShowHtml => ACTION_SHOW_HTML,
            Self::ShowWithdrawal => ACTION_SHOW_WITHDRAWAL,
            Self::Custom(value) => value,
        }
    }
}

impl From<String> for OnSelectedAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            ACTION_NO_ACTION => Self::NoAction,
            ACTION_EDIT_PROFILE_ITEM => Self::EditProfileItem,
            ACTION_SHOW_HTML => Self::ShowHtml,
            ACTION_SHOW_WITHDRAWAL => Self::ShowWithdrawal,
            _ => Self::Custom(value),
        }
    }
}

impl From<OnSelectedAction> for String {
    fn from(value: OnSelectedAction) -> Self {
        value.as_str().to_string()
    }
}

/// Named HTML resource, optionally scoped to a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResource {
    pub name: String,
    pub bundle_identifier: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HtmlItemFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    in_cohorts: Option<BTreeSet<String>>,
    #[serde(default)]
    not_in_cohorts: Option<BTreeSet<String>>,
    html_resource: String,
    #[serde(default)]
    bundle_identifier: Option<String>,
}

/// Static row pointing at an HTML resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HtmlItemFields")]
pub struct HtmlItem {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub cohorts: CohortConstraint,
    pub resource: HtmlResource,
}

impl From<HtmlItemFields> for HtmlItem {
    fn from(fields: HtmlItemFields) -> Self {
        Self {
            title: fields.title,
            detail: fields.detail,
            cohorts: CohortConstraint {
                in_cohorts: fields.in_cohorts,
                not_in_cohorts: fields.not_in_cohorts,
            },
            resource: HtmlResource {
                name: fields.html_resource,
                bundle_identifier: fields.bundle_identifier,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoundItemFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    in_cohorts: Option<BTreeSet<String>>,
    #[serde(default)]
    not_in_cohorts: Option<BTreeSet<String>>,
    profile_item_key: String,
    #[serde(default)]
    edit_task_identifier: Option<String>,
    #[serde(default)]
    is_editable: Option<bool>,
    #[serde(default)]
    on_selected: Option<OnSelectedAction>,
}

/// Row bound to an externally owned profile value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BoundItemFields")]
pub struct BoundItem {
    pub title: Option<String>,
    pub cohorts: CohortConstraint,
    pub profile_item_key: String,
    pub edit_task_identifier: Option<String>,
    pub is_editable_override: Option<bool>,
    pub on_selected: Option<OnSelectedAction>,
}

impl From<BoundItemFields> for BoundItem {
    fn from(fields: BoundItemFields) -> Self {
        Self {
            title: fields.title,
            cohorts: CohortConstraint {
                in_cohorts: fields.in_cohorts,
                not_in_cohorts: fields.not_in_cohorts,
            },
            profile_item_key: fields.profile_item_key,
            edit_task_identifier: fields.edit_task_identifier,
            is_editable_override: fields.is_editable,
            on_selected: fields.on_selected,
        }
    }
}

impl BoundItem {
    pub fn value(&self, store: &dyn ItemStore) -> Option<Value> {
        store.get_value(&self.profile_item_key)
    }

    /// Display text for the current store value.
    pub fn detail(&self, store: &dyn ItemStore) -> Option<String> {
        self.value(store).and_then(|value| render_value(&value))
    }

    pub fn is_editable(&self, store: &dyn ItemStore) -> bool {
        if store.is_readonly(&self.profile_item_key) {
            return false;
        }
        self.is_editable_override.unwrap_or(false)
    }

    /// Selection action; an edit action is only offered while editable.
    pub fn on_selected(&self, store: &dyn ItemStore) -> OnSelectedAction {
        let editable = self.is_editable(store);
        match &self.on_selected {
            Some(OnSelectedAction::EditProfileItem) if !editable => OnSelectedAction::NoAction,
            Some(action) => action.clone(),
            None if editable => OnSelectedAction::EditProfileItem,
            None => OnSelectedAction::NoAction,
        }
    }
}

/// One row of a profile section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileTableItem {
    Html(HtmlItem),
    Bound(BoundItem),
}

impl ProfileTableItem {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Html(item) => item.title.as_deref(),
            Self::Bound(item) => item.title.as_deref(),
        }
    }

    pub fn detail(&self, store: &dyn ItemStore) -> Option<String> {
        match self {
            Self::Html(item) => item.detail.clone(),
            Self::Bound(item) => item.detail(store),
        }
    }

    pub fn is_editable(&self, store: &dyn ItemStore) -> bool {
        match self {
            Self::Html(_) => false,
            Self::Bound(item) => item.is_editable(store),
        }
    }

    pub fn on_selected(&self, store: &dyn ItemStore) -> OnSelectedAction {
        match self {
            Self::Html(_) => OnSelectedAction::ShowHtml,
            Self::Bound(item) => item.on_selected(store),
        }
    }
}

impl CohortGated for ProfileTableItem {
    fn cohorts(&self) -> &CohortConstraint {
        match self {
            Self::Html(item) => &item.cohorts,
            Self::Bound(item) => &item.cohorts,
        }
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(render_value).collect();
            Some(parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_value, BoundItem, OnSelectedAction};
    use crate::profile::cohort::CohortConstraint;
    use crate::profile::store::InMemoryItemStore;
    use serde_json::json;

    fn bound(key: &str, editable: Option<bool>) -> BoundItem {
        BoundItem {
            title: Some("Name".to_string()),
            cohorts: CohortConstraint::unconstrained(),
            profile_item_key: key.to_string(),
            edit_task_identifier: None,
            is_editable_override: editable,
            on_selected: None,
        }
    }

    #[test]
    fn readonly_key_overrides_editable_flag() {
        let mut store = InMemoryItemStore::new();
        store.set_readonly("externalId", true);
        let item = bound("externalId", Some(true));

        assert!(!item.is_editable(&store));
        assert_eq!(item.on_selected(&store), OnSelectedAction::NoAction);
    }

    #[test]
    fn explicit_edit_action_is_dropped_for_readonly_key() {
        let item: BoundItem = serde_json::from_value(json!({
            "type": "profileItem",
            "profileItemKey": "externalId",
            "isEditable": true,
            "onSelected": "editProfileItem"
        }))
        .unwrap();
        let mut store = InMemoryItemStore::new();
        assert_eq!(item.on_selected(&store), OnSelectedAction::EditProfileItem);

        store.set_readonly("externalId", true);
        assert!(!item.is_editable(&store));
        assert_eq!(item.on_selected(&store), OnSelectedAction::NoAction);

        let withdrawal = BoundItem {
            on_selected: Some(OnSelectedAction::ShowWithdrawal),
            ..bound("externalId", None)
        };
        assert_eq!(
            withdrawal.on_selected(&store),
            OnSelectedAction::ShowWithdrawal
        );
    }

    #[test]
    fn editable_defaults_to_false_without_override() {
        let store = InMemoryItemStore::new();
        assert!(!bound("name", None).is_editable(&store));
        assert!(bound("name", Some(true)).is_editable(&store));
        assert_eq!(
            bound("name", Some(true)).on_selected(&store),
            OnSelectedAction::EditProfileItem
        );
    }

    #[test]
    fn detail_reads_through_store_on_every_access() {
        let mut store = InMemoryItemStore::new();
        let item = bound("name", Some(true));
        assert_eq!(item.detail(&store), None);

        store.force_value("name", json!("Alex"));
        assert_eq!(item.detail(&store).as_deref(), Some("Alex"));

        store.force_value("name", json!("Sam"));
        assert_eq!(item.detail(&store).as_deref(), Some("Sam"));
        assert_eq!(item.value(&store), Some(json!("Sam")));
    }

    #[test]
    fn renders_scalar_and_list_values() {
        assert_eq!(render_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&json!(42)).as_deref(), Some("42"));
        assert_eq!(render_value(&json!(["a", "b"])).as_deref(), Some("a, b"));
        assert_eq!(render_value(&json!(null)), None);
    }

    #[test]
    fn on_selected_keeps_host_defined_names() {
        let action = OnSelectedAction::from("openConsentPdf".to_string());
        assert_eq!(action, OnSelectedAction::Custom("openConsentPdf".to_string()));
        assert_eq!(
            OnSelectedAction::from("showHTML".to_string()),
            OnSelectedAction::ShowHtml
        );
        assert_eq!(String::from(action), "openConsentPdf");
    }
}
