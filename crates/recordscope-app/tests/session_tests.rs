// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use recordscope_app::{
    FilterId, NotificationKind, RawRow, RecordId, RecordSource, Session, SessionCommand,
    SessionEvent,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct FakeSource {
    fields: BTreeMap<String, Vec<String>>,
    rows: BTreeMap<String, Vec<RawRow>>,
    field_calls: usize,
    fetch_calls: usize,
    fail_fetch: bool,
    fail_types: bool,
    last_limit: Option<usize>,
}

impl FakeSource {
    fn accounts() -> Self {
        let mut source = Self::default();
        source.fields.insert(
            "Account".to_owned(),
            ["Id", "Name", "Industry", "Status", "Website__c"]
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
        );
        let accounts = [
            ("001", "Acme Corp", "Tech", "Open", "acme.example"),
            ("002", "Globex", "Tech", "Closed", "globex.example"),
            ("003", "Initech", "Retail", "Open", "initech.example"),
            ("004", "Umbrella", "TECH", "Pending", ""),
            ("005", "Hooli", "Finance", "Closed", "hooli.example"),
        ];
        source.rows.insert(
            "Account".to_owned(),
            accounts
                .iter()
                .map(|(id, name, industry, status, website)| {
                    RawRow::new()
                        .with("Id", *id)
                        .with("Name", *name)
                        .with("Industry", *industry)
                        .with("Status", *status)
                        .with("Website__c", *website)
                })
                .collect(),
        );
        source
            .fields
            .insert("Contact".to_owned(), vec!["Id".to_owned(), "Email".to_owned()]);
        source.rows.insert("Contact".to_owned(), Vec::new());
        source
    }
}

impl RecordSource for FakeSource {
    fn object_types(&mut self) -> Result<Vec<String>> {
        if self.fail_types {
            bail!("catalog offline");
        }
        Ok(self.fields.keys().cloned().collect())
    }

    fn field_names(&mut self, object_type: &str) -> Result<Vec<String>> {
        self.field_calls += 1;
        self.fields
            .get(object_type)
            .cloned()
            .ok_or_else(|| anyhow!("unknown type {object_type}"))
    }

    fn fetch_records(
        &mut self,
        object_type: &str,
        fields: &[String],
        limit: usize,
    ) -> Result<Vec<RawRow>> {
        self.fetch_calls += 1;
        self.last_limit = Some(limit);
        if self.fail_fetch {
            bail!("connection reset");
        }
        let rows = self
            .rows
            .get(object_type)
            .ok_or_else(|| anyhow!("unknown type {object_type}"))?;
        Ok(rows
            .iter()
            .take(limit)
            .map(|row| {
                fields
                    .iter()
                    .map(|field| (field.clone(), row.get(field).map(str::to_owned)))
                    .chain(std::iter::once((
                        "Id".to_owned(),
                        row.get("Id").map(str::to_owned),
                    )))
                    .collect()
            })
            .collect())
    }
}

fn loaded_session(source: &mut FakeSource) -> Session {
    let mut session = Session::default();
    session.dispatch(source, SessionCommand::LoadObjectTypes);
    session.dispatch(source, SessionCommand::SelectType("Account".to_owned()));
    session.dispatch(source, SessionCommand::FetchRecords);
    session
}

fn displayed_ids(session: &Session) -> Vec<&str> {
    session
        .displayed()
        .iter()
        .map(|record| record.id.as_str())
        .collect()
}

fn set_filter(
    session: &mut Session,
    source: &mut FakeSource,
    id: FilterId,
    field: &str,
    operator: &str,
    value: &str,
) -> Vec<SessionEvent> {
    session.dispatch(
        source,
        SessionCommand::UpdateFilter {
            id,
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: value.to_owned(),
        },
    )
}

fn add_filter(session: &mut Session, source: &mut FakeSource) -> FilterId {
    match session.dispatch(source, SessionCommand::AddFilter).as_slice() {
        [SessionEvent::FilterAdded(id)] => *id,
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn fetch_projects_every_row_and_selects_all_fields() {
    let mut source = FakeSource::accounts();
    let session = loaded_session(&mut source);

    assert_eq!(session.object_types(), ["Account", "Contact"]);
    assert_eq!(session.selected_type(), Some("Account"));
    assert_eq!(session.selected_fields().len(), 5);
    assert_eq!(session.records().len(), 5);
    assert_eq!(session.displayed().len(), 5);
    assert!(!session.no_results());
    assert_eq!(source.last_limit, Some(session.page_size()));

    let first = &session.records()[0];
    assert_eq!(first.display_name, "Acme Corp");
    assert_eq!(first.value("Website__c"), "acme.example");
    assert_eq!(
        first.field("Website__c").map(|field| field.label.as_str()),
        Some("Website")
    );
}

#[test]
fn fetch_without_type_is_an_info_notification() {
    let mut source = FakeSource::accounts();
    let mut session = Session::default();

    let events = session.dispatch(&mut source, SessionCommand::FetchRecords);
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Notified(notification)] if notification.kind == NotificationKind::Info
    ));
    assert_eq!(source.fetch_calls, 0);
    assert!(session.records().is_empty());
}

#[test]
fn fetch_failure_keeps_last_good_snapshot() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);
    let before = session.records().to_vec();

    source.fail_fetch = true;
    let events = session.dispatch(&mut source, SessionCommand::FetchRecords);

    let notifications = session.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert!(notifications[0].message.contains("connection reset"));
    assert_eq!(events.len(), 1);
    assert_eq!(session.records().len(), before.len());
    assert!(Arc::ptr_eq(&session.records()[0], &before[0]));
    assert!(session.take_notifications().is_empty());
}

#[test]
fn type_catalog_failure_is_reported() {
    let mut source = FakeSource::accounts();
    source.fail_types = true;
    let mut session = Session::default();

    session.dispatch(&mut source, SessionCommand::LoadObjectTypes);
    assert!(session.object_types().is_empty());
    assert_eq!(session.notifications()[0].kind, NotificationKind::Error);
}

#[test]
fn filters_combine_with_and_and_ignore_case() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let industry = add_filter(&mut session, &mut source);
    let status = add_filter(&mut session, &mut source);
    assert_ne!(industry, status);

    set_filter(&mut session, &mut source, industry, "Industry", "=", "Tech");
    let events = set_filter(&mut session, &mut source, status, "Status", "!=", "Closed");

    assert_eq!(displayed_ids(&session), vec!["001", "004"]);
    assert_eq!(session.filtered().len(), 2);
    assert!(events.contains(&SessionEvent::ResultsChanged {
        total: 5,
        filtered: 2,
        displayed: 2,
    }));
}

#[test]
fn operator_aliases_are_normalized() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Status", "ne", "open");
    assert_eq!(displayed_ids(&session), vec!["002", "004", "005"]);

    set_filter(&mut session, &mut source, id, "Name", "like", "o");
    assert_eq!(displayed_ids(&session), vec!["001", "002", "005"]);
}

#[test]
fn unsupported_operator_excludes_everything() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Industry", "between", "Tech");

    assert!(session.displayed().is_empty());
    assert!(session.no_results());
    assert!(session.notifications().is_empty());
}

#[test]
fn inert_filter_leaves_results_alone() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    add_filter(&mut session, &mut source);
    session.dispatch(&mut source, SessionCommand::ApplyFilters);
    assert_eq!(session.displayed().len(), 5);
}

#[test]
fn search_layers_on_top_of_filters() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Status", "=", "Open");
    session.dispatch(&mut source, SessionCommand::Search("INI".to_owned()));
    assert_eq!(displayed_ids(&session), vec!["003"]);

    session.dispatch(&mut source, SessionCommand::Search("globex".to_owned()));
    assert!(session.displayed().is_empty());
    assert!(session.no_results());

    session.dispatch(&mut source, SessionCommand::RemoveFilter(id));
    assert_eq!(displayed_ids(&session), vec!["002"]);
    assert!(!session.no_results());

    session.dispatch(&mut source, SessionCommand::Search(String::new()));
    assert_eq!(session.displayed().len(), 5);
}

#[test]
fn search_finds_single_acme_record() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    session.dispatch(&mut source, SessionCommand::Search("acme".to_owned()));
    assert_eq!(displayed_ids(&session), vec!["001"]);
}

#[test]
fn search_before_fetch_is_rejected() {
    let mut source = FakeSource::accounts();
    let mut session = Session::default();
    session.dispatch(&mut source, SessionCommand::SelectType("Account".to_owned()));

    session.dispatch(&mut source, SessionCommand::Search("acme".to_owned()));
    assert_eq!(session.search_query(), "");
    assert_eq!(session.notifications().len(), 1);
    assert_eq!(session.notifications()[0].kind, NotificationKind::Info);
}

#[test]
fn clear_filters_restores_full_set() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Industry", "=", "Retail");
    assert_eq!(session.displayed().len(), 1);

    session.dispatch(&mut source, SessionCommand::ClearFilters);
    assert!(session.filters().is_empty());
    assert_eq!(session.displayed().len(), 5);
}

#[test]
fn changing_type_resets_state_and_uses_field_cache() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);
    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Industry", "=", "Tech");
    session.dispatch(&mut source, SessionCommand::Search("acme".to_owned()));

    session.dispatch(&mut source, SessionCommand::SelectType("Contact".to_owned()));
    assert!(session.filters().is_empty());
    assert_eq!(session.search_query(), "");
    assert!(session.records().is_empty());
    assert!(session.displayed().is_empty());
    assert!(!session.no_results());
    assert_eq!(source.field_calls, 2);

    session.dispatch(&mut source, SessionCommand::SelectType("Account".to_owned()));
    assert_eq!(source.field_calls, 2);
    assert_eq!(session.field_cache().len(), 2);

    session.dispatch(&mut source, SessionCommand::ReloadFields);
    assert_eq!(source.field_calls, 3);
}

#[test]
fn empty_fetch_sets_no_results() {
    let mut source = FakeSource::accounts();
    let mut session = Session::default();
    session.dispatch(&mut source, SessionCommand::SelectType("Contact".to_owned()));
    session.dispatch(&mut source, SessionCommand::FetchRecords);

    assert!(session.records().is_empty());
    assert!(session.no_results());
    assert!(
        session
            .notifications()
            .iter()
            .any(|notification| notification.message.contains("No Contact records"))
    );
}

#[test]
fn select_fields_narrows_projection() {
    let mut source = FakeSource::accounts();
    let mut session = Session::default();
    session.dispatch(&mut source, SessionCommand::SelectType("Account".to_owned()));

    let events = session.dispatch(
        &mut source,
        SessionCommand::SelectFields(vec!["name".to_owned(), "Status".to_owned()]),
    );
    assert_eq!(events, vec![SessionEvent::FieldsSelected(2)]);
    session.dispatch(&mut source, SessionCommand::FetchRecords);

    let record = &session.records()[0];
    assert_eq!(record.full_fields.len(), 2);
    assert_eq!(record.full_fields[0].name, "Name");
    assert_eq!(record.id.as_str(), "001");

    session.dispatch(
        &mut source,
        SessionCommand::SelectFields(vec!["Nope".to_owned()]),
    );
    assert_eq!(session.selected_fields().len(), 2);
    assert!(
        session
            .notifications()
            .iter()
            .any(|notification| notification.message.contains("Nope"))
    );
}

#[test]
fn record_field_search_only_touches_one_record() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);
    let other_before = Arc::clone(&session.records()[1]);

    session.dispatch(
        &mut source,
        SessionCommand::SearchRecordFields {
            id: RecordId::from("001"),
            query: "web".to_owned(),
        },
    );

    let target = session
        .record(&RecordId::from("001"))
        .expect("record 001 should exist");
    let visible = target
        .field_chunks_filtered
        .iter()
        .flat_map(|chunk| chunk.fields.iter().map(|field| field.name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(visible, vec!["Website__c"]);
    assert!(Arc::ptr_eq(&session.records()[1], &other_before));
    assert!(Arc::ptr_eq(&session.displayed()[0], &session.records()[0]));

    session.dispatch(
        &mut source,
        SessionCommand::SearchRecordFields {
            id: RecordId::from("001"),
            query: String::new(),
        },
    );
    let target = &session.records()[0];
    assert_eq!(target.field_chunks_filtered, target.field_chunks);
}

#[test]
fn toggle_expanded_flips_one_record() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);

    let events = session.dispatch(
        &mut source,
        SessionCommand::ToggleExpanded(RecordId::from("003")),
    );
    assert_eq!(events, vec![SessionEvent::RecordChanged(RecordId::from("003"))]);
    assert!(session.records()[2].expanded);
    assert!(!session.records()[0].expanded);

    session.dispatch(
        &mut source,
        SessionCommand::ToggleExpanded(RecordId::from("missing")),
    );
    assert_eq!(session.notifications().len(), 1);
}

#[test]
fn expanded_state_survives_filtering() {
    let mut source = FakeSource::accounts();
    let mut session = loaded_session(&mut source);
    session.dispatch(
        &mut source,
        SessionCommand::ToggleExpanded(RecordId::from("003")),
    );

    let id = add_filter(&mut session, &mut source);
    set_filter(&mut session, &mut source, id, "Industry", "=", "Retail");
    assert!(session.displayed()[0].expanded);
}

#[test]
fn shared_source_ids_stay_separate_records() {
    let mut source = FakeSource::accounts();
    if let Some(rows) = source.rows.get_mut("Account") {
        rows.push(
            RawRow::new()
                .with("Id", "001")
                .with("Name", "Acme Holdings")
                .with("Industry", "Finance"),
        );
    }
    let mut session = loaded_session(&mut source);
    let names = |session: &Session| {
        session
            .records()
            .iter()
            .map(|record| record.display_name.clone())
            .collect::<Vec<_>>()
    };
    let before = names(&session);

    session.dispatch(
        &mut source,
        SessionCommand::ToggleExpanded(RecordId::from("001")),
    );
    assert_eq!(names(&session), before);
    assert!(session.records()[0].expanded);
    assert!(!session.records()[5].expanded);
    assert_eq!(session.records()[5].id.as_str(), "001#6");

    session.dispatch(
        &mut source,
        SessionCommand::SearchRecordFields {
            id: RecordId::from("001#6"),
            query: "industry".to_owned(),
        },
    );
    assert_eq!(names(&session), before);
    assert_eq!(session.records()[5].field_search_term, "industry");
    assert!(session.records()[0].field_search_term.is_empty());
}
