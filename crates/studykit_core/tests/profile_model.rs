use serde_json::{json, Value};
use studykit_core::{
    BoundItem, Decoded, Factory, InMemoryItemStore, ItemStore, ItemStoreError, Membership,
    MembershipProvider, OnSelectedAction, ProfileDataSource, ProfileManager, ProfileSection,
    ProfileStorage, ProfileTableItem,
};

fn membership(labels: &[&str]) -> Membership {
    labels.iter().map(|label| label.to_string()).collect()
}

fn data_source_document() -> Value {
    json!({
        "catType": "profileDataSource",
        "sections": [
            {
                "title": "Participant",
                "icon": "profileIcon",
                "items": [
                    { "type": "profileItem", "title": "Name", "profileItemKey": "name", "isEditable": true },
                    { "type": "profileItem", "title": "Participant ID", "profileItemKey": "externalId", "isEditable": true },
                    { "type": "profileItem", "title": "Glucose target", "profileItemKey": "glucoseTarget", "inCohorts": ["diabetes"] },
                    { "type": "resource", "title": "Study resources" },
                    { "type": "html", "title": "Pregnancy safety", "htmlResource": "pregnancy", "notInCohorts": ["pregnant"] }
                ]
            },
            {
                "title": "About",
                "items": [
                    { "type": "html", "title": "Privacy policy", "detail": "v2", "htmlResource": "privacy", "bundleIdentifier": "org.example.study" },
                    { "type": "studyParticipation", "title": "Leave study" }
                ]
            }
        ]
    })
}

fn decode_data_source(document: &Value) -> ProfileDataSource {
    let (_, decoded) = Factory::standard()
        .decode_category(document)
        .expect("data source should decode");
    let Decoded::ProfileDataSource(source) = decoded else {
        panic!("expected data source");
    };
    source
}

fn titles(items: &[&ProfileTableItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.title().unwrap_or_default().to_string())
        .collect()
}

struct StudyParticipant {
    data_groups: Vec<&'static str>,
}

impl MembershipProvider for StudyParticipant {
    fn current_membership(&self) -> Membership {
        membership(&self.data_groups)
    }
}

#[test]
fn reserved_items_are_omitted_from_sections() {
    let source = decode_data_source(&data_source_document());

    assert_eq!(source.number_of_sections(), 2);
    let participant = source.section(0).expect("first section");
    assert_eq!(participant.title.as_deref(), Some("Participant"));
    assert_eq!(participant.icon.as_deref(), Some("profileIcon"));
    assert_eq!(participant.decoded_len(), 4);
    assert_eq!(source.section(1).expect("second section").decoded_len(), 1);
}

#[test]
fn items_are_filtered_against_current_membership_on_each_read() {
    let source = decode_data_source(&data_source_document());
    let section = source.section(0).expect("first section");

    assert_eq!(
        titles(&section.items(&membership(&[]))),
        vec!["Name", "Participant ID", "Pregnancy safety"]
    );
    assert_eq!(
        titles(&section.items(&membership(&["diabetes"]))),
        vec!["Name", "Participant ID", "Glucose target", "Pregnancy safety"]
    );
    assert_eq!(
        titles(&section.items(&membership(&["diabetes", "pregnant"]))),
        vec!["Name", "Participant ID", "Glucose target"]
    );
    assert_eq!(
        titles(&section.items(&membership(&[]))),
        vec!["Name", "Participant ID", "Pregnancy safety"]
    );
}

#[test]
fn membership_provider_is_consulted_per_call() {
    let source = decode_data_source(&data_source_document());
    let section = source.section(0).expect("first section");
    let mut participant = StudyParticipant {
        data_groups: vec![],
    };

    assert_eq!(section.items_for(&participant).len(), 3);
    participant.data_groups.push("pregnant");
    assert_eq!(section.items_for(&participant).len(), 2);
}

#[test]
fn row_accessors_follow_filtered_view() {
    let source = decode_data_source(&data_source_document());
    let groups = membership(&["pregnant"]);

    assert_eq!(source.number_of_rows(0, &groups), 2);
    assert_eq!(source.number_of_rows(1, &groups), 1);
    assert_eq!(source.number_of_rows(9, &groups), 0);
    assert!(source.item_at(0, 2, &groups).is_none());

    let privacy = source.item_at(1, 0, &groups).expect("privacy row");
    let ProfileTableItem::Html(html) = privacy else {
        panic!("expected html row");
    };
    assert_eq!(html.resource.name, "privacy");
    assert_eq!(
        html.resource.bundle_identifier.as_deref(),
        Some("org.example.study")
    );
}

#[test]
fn bound_rows_read_through_the_item_store() {
    let source = decode_data_source(&data_source_document());
    let mut store = InMemoryItemStore::new();
    store.force_value("name", json!("Alex"));
    store.force_value("externalId", json!("P-1042"));
    store.set_readonly("externalId", true);

    let rows = source.section(0).expect("section").items(&membership(&[]));
    let name = rows[0];
    let external_id = rows[1];
    let html = rows[2];

    assert_eq!(name.detail(&store).as_deref(), Some("Alex"));
    assert!(name.is_editable(&store));
    assert_eq!(name.on_selected(&store), OnSelectedAction::EditProfileItem);

    assert_eq!(external_id.detail(&store).as_deref(), Some("P-1042"));
    assert!(!external_id.is_editable(&store));
    assert_eq!(external_id.on_selected(&store), OnSelectedAction::NoAction);

    assert!(!html.is_editable(&store));
    assert_eq!(html.on_selected(&store), OnSelectedAction::ShowHtml);

    store.set_value("name", json!("Sam")).expect("name is writable");
    assert_eq!(name.detail(&store).as_deref(), Some("Sam"));
}

#[test]
fn unknown_item_type_aborts_the_whole_data_source() {
    let mut document = data_source_document();
    document["sections"][1]["items"]
        .as_array_mut()
        .expect("items array")
        .push(json!({ "type": "videoPlayer" }));

    let err = Factory::standard()
        .decode_category(&document)
        .expect_err("unknown tag must abort");
    assert_eq!(err.path(), Some("sections[1].items[2]"));
}

#[test]
fn explicit_on_selected_overrides_the_default_action() {
    let section = ProfileSection::decode(
        &Factory::standard(),
        &json!({
            "items": [
                { "type": "profileItem", "title": "Withdraw", "profileItemKey": "status", "onSelected": "showWithdrawal" }
            ]
        }),
    )
    .expect("section");
    let store = InMemoryItemStore::new();
    let rows = section.items(&membership(&[]));
    assert_eq!(rows[0].on_selected(&store), OnSelectedAction::ShowWithdrawal);
}

#[test]
fn manager_seeds_store_defaults_and_readonly_flags() {
    let (_, decoded) = Factory::standard()
        .decode_category(&json!({
            "catType": "profileManager",
            "items": [
                { "type": "userDefaults", "profileKey": "name" },
                { "type": "keychain", "profileKey": "externalId", "sourceKey": "bridge.externalId", "readonly": true, "defaultValue": "unassigned" },
                { "type": "healthKit", "profileKey": "height" }
            ]
        }))
        .expect("manager");
    let Decoded::ProfileManager(manager) = decoded else {
        panic!("expected profile manager");
    };

    assert_eq!(manager.items().len(), 2);
    let external = manager.item("externalId").expect("external id item");
    assert_eq!(external.storage, ProfileStorage::Keychain);
    assert_eq!(external.source_key(), "bridge.externalId");
    assert_eq!(manager.item("name").expect("name").source_key(), "name");

    let mut store = InMemoryItemStore::from_manager(&manager);
    assert_eq!(store.get_value("externalId"), Some(json!("unassigned")));
    assert!(store.is_readonly("externalId"));
    assert_eq!(
        store.set_value("externalId", json!("P-1")),
        Err(ItemStoreError::ReadOnly("externalId".to_string()))
    );

    let item = BoundItem {
        title: None,
        cohorts: Default::default(),
        profile_item_key: "externalId".to_string(),
        edit_task_identifier: Some("editExternalId".to_string()),
        is_editable_override: Some(true),
        on_selected: None,
    };
    assert!(!item.is_editable(&store));
}

#[test]
fn empty_manager_and_data_source_decode() {
    let factory = Factory::standard();
    let (_, manager) = factory
        .decode_category(&json!({ "catType": "profileManager" }))
        .expect("empty manager");
    assert_eq!(manager, Decoded::ProfileManager(ProfileManager::default()));

    let (_, source) = factory
        .decode_category(&json!({ "catType": "profileDataSource" }))
        .expect("empty data source");
    assert_eq!(source, Decoded::ProfileDataSource(ProfileDataSource::default()));
}
