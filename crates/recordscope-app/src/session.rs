// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cache::FieldCache;
use crate::filter::{Filter, FilterOp, apply_filters, has_active_filters};
use crate::ids::{FilterId, RecordId};
use crate::model::{FieldMeta, RawRow, Record};
use crate::project::project_rows;
use crate::search::{apply_search, search_record_fields};

pub const DEFAULT_PAGE_SIZE: usize = 200;

/// The remote side of a session: type catalog, field catalog, and rows.
pub trait RecordSource {
    fn object_types(&mut self) -> Result<Vec<String>>;
    fn field_names(&mut self, object_type: &str) -> Result<Vec<String>>;
    fn fetch_records(
        &mut self,
        object_type: &str,
        fields: &[String],
        limit: usize,
    ) -> Result<Vec<RawRow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    Info,
    Error,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    LoadObjectTypes,
    SelectType(String),
    SelectFields(Vec<String>),
    ReloadFields,
    FetchRecords,
    AddFilter,
    UpdateFilter {
        id: FilterId,
        field: String,
        operator: String,
        value: String,
    },
    RemoveFilter(FilterId),
    ApplyFilters,
    ClearFilters,
    Search(String),
    ToggleExpanded(RecordId),
    SearchRecordFields {
        id: RecordId,
        query: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ObjectTypesLoaded(usize),
    TypeSelected(Option<String>),
    FieldsLoaded(usize),
    FieldsSelected(usize),
    RecordsFetched(usize),
    FilterAdded(FilterId),
    FilterUpdated(FilterId),
    FilterRemoved(FilterId),
    FiltersCleared,
    ResultsChanged {
        total: usize,
        filtered: usize,
        displayed: usize,
    },
    RecordChanged(RecordId),
    Notified(Notification),
}

/// All state behind one record-browsing screen.
///
/// The three record vectors share `Arc`s: `filtered` is a subset of
/// `records`, and `displayed` a subset of `filtered`. Every change builds new
/// vectors and swaps them in.
#[derive(Debug, Clone)]
pub struct Session {
    object_types: Vec<String>,
    selected_type: Option<String>,
    field_cache: FieldCache,
    selected_fields: Vec<FieldMeta>,
    filters: Vec<Filter>,
    next_filter_id: u64,
    search_query: String,
    records: Vec<Arc<Record>>,
    filtered: Vec<Arc<Record>>,
    displayed: Vec<Arc<Record>>,
    no_results: bool,
    page_size: usize,
    notifications: Vec<Notification>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            object_types: Vec::new(),
            selected_type: None,
            field_cache: FieldCache::new(),
            selected_fields: Vec::new(),
            filters: Vec::new(),
            next_filter_id: 1,
            search_query: String::new(),
            records: Vec::new(),
            filtered: Vec::new(),
            displayed: Vec::new(),
            no_results: false,
            page_size: page_size.max(1),
            notifications: Vec::new(),
        }
    }

    pub fn dispatch<S>(&mut self, source: &mut S, command: SessionCommand) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        match command {
            SessionCommand::LoadObjectTypes => self.load_object_types(source),
            SessionCommand::SelectType(object_type) => self.select_type(source, &object_type),
            SessionCommand::SelectFields(names) => self.select_fields(&names),
            SessionCommand::ReloadFields => self.reload_fields(source),
            SessionCommand::FetchRecords => self.fetch_records(source),
            SessionCommand::AddFilter => self.add_filter(),
            SessionCommand::UpdateFilter {
                id,
                field,
                operator,
                value,
            } => self.update_filter(id, field, &operator, value),
            SessionCommand::RemoveFilter(id) => self.remove_filter(id),
            SessionCommand::ApplyFilters => self.apply_filters(),
            SessionCommand::ClearFilters => self.clear_filters(),
            SessionCommand::Search(query) => self.search(query),
            SessionCommand::ToggleExpanded(id) => self.toggle_expanded(&id),
            SessionCommand::SearchRecordFields { id, query } => {
                self.search_record_fields(&id, &query)
            }
        }
    }

    pub fn object_types(&self) -> &[String] {
        &self.object_types
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.selected_type.as_deref()
    }

    /// Cached catalog of the selected type, in source order.
    pub fn field_catalog(&self) -> Option<&[FieldMeta]> {
        self.selected_type
            .as_deref()
            .and_then(|object_type| self.field_cache.get(object_type))
    }

    pub fn field_cache(&self) -> &FieldCache {
        &self.field_cache
    }

    pub fn selected_fields(&self) -> &[FieldMeta] {
        &self.selected_fields
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn filtered(&self) -> &[Arc<Record>] {
        &self.filtered
    }

    pub fn displayed(&self) -> &[Arc<Record>] {
        &self.displayed
    }

    pub fn record(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn no_results(&self) -> bool {
        self.no_results
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn load_object_types<S>(&mut self, source: &mut S) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        match source.object_types() {
            Ok(types) => {
                debug!(count = types.len(), "loaded object types");
                self.object_types = types;
                vec![SessionEvent::ObjectTypesLoaded(self.object_types.len())]
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "object type lookup failed");
                vec![self.notify(Notification::error(format!(
                    "Could not load record types: {err:#}"
                )))]
            }
        }
    }

    fn select_type<S>(&mut self, source: &mut S, object_type: &str) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        self.reset();
        let object_type = object_type.trim();
        if object_type.is_empty() {
            self.selected_type = None;
            return vec![SessionEvent::TypeSelected(None)];
        }

        self.selected_type = Some(object_type.to_owned());
        let mut events = vec![SessionEvent::TypeSelected(self.selected_type.clone())];
        events.extend(self.load_fields(source, object_type));
        events
    }

    fn reload_fields<S>(&mut self, source: &mut S) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        let Some(object_type) = self.selected_type.clone() else {
            return vec![self.notify(Notification::info("Select a record type first"))];
        };
        self.field_cache.invalidate(&object_type);
        self.load_fields(source, &object_type)
    }

    /// Loads the catalog through the cache and selects every field.
    fn load_fields<S>(&mut self, source: &mut S, object_type: &str) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        let loaded = self
            .field_cache
            .get_or_load(object_type, || source.field_names(object_type))
            .map(<[FieldMeta]>::to_vec);

        match loaded {
            Ok(fields) if fields.is_empty() => {
                self.selected_fields.clear();
                vec![self.notify(Notification::info(format!(
                    "No fields available for {object_type}"
                )))]
            }
            Ok(fields) => {
                self.selected_fields = fields;
                vec![SessionEvent::FieldsLoaded(self.selected_fields.len())]
            }
            Err(err) => {
                error!(object_type, error = %format!("{err:#}"), "field lookup failed");
                vec![self.notify(Notification::error(format!(
                    "Could not load fields for {object_type}: {err:#}"
                )))]
            }
        }
    }

    fn select_fields(&mut self, names: &[String]) -> Vec<SessionEvent> {
        let Some(catalog) = self.field_catalog() else {
            return vec![self.notify(Notification::info(
                "Select a record type with available fields first",
            ))];
        };

        let mut selected: Vec<FieldMeta> = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names.iter().map(|name| name.trim()).filter(|name| !name.is_empty()) {
            match catalog.iter().find(|meta| meta.name.eq_ignore_ascii_case(name)) {
                Some(meta) if selected.contains(meta) => {}
                Some(meta) => selected.push(meta.clone()),
                None => unknown.push(name.to_owned()),
            }
        }

        if !unknown.is_empty() {
            return vec![self.notify(Notification::info(format!(
                "Unknown fields: {}",
                unknown.join(", ")
            )))];
        }
        if selected.is_empty() {
            return vec![self.notify(Notification::info("Select at least one field"))];
        }

        self.selected_fields = selected;
        vec![SessionEvent::FieldsSelected(self.selected_fields.len())]
    }

    fn fetch_records<S>(&mut self, source: &mut S) -> Vec<SessionEvent>
    where
        S: RecordSource + ?Sized,
    {
        let Some(object_type) = self.selected_type.clone() else {
            return vec![self.notify(Notification::info("Select a record type first"))];
        };
        if self.selected_fields.is_empty() {
            return vec![self.notify(Notification::info(format!(
                "No fields available for {object_type}"
            )))];
        }

        let names = self
            .selected_fields
            .iter()
            .map(|meta| meta.name.clone())
            .collect::<Vec<_>>();
        let rows = match source.fetch_records(&object_type, &names, self.page_size) {
            Ok(rows) => rows,
            Err(err) => {
                error!(object_type, error = %format!("{err:#}"), "record fetch failed");
                return vec![self.notify(Notification::error(format!(
                    "Could not fetch {object_type} records: {err:#}"
                )))];
            }
        };

        self.records = project_rows(&rows, &self.selected_fields)
            .into_iter()
            .map(Arc::new)
            .collect();
        info!(object_type, count = self.records.len(), "fetched records");

        let mut events = vec![SessionEvent::RecordsFetched(self.records.len())];
        events.extend(self.recompute());
        if self.records.is_empty() {
            events.push(self.notify(Notification::info(format!(
                "No {object_type} records found"
            ))));
        }
        events
    }

    fn add_filter(&mut self) -> Vec<SessionEvent> {
        let id = FilterId::new(self.next_filter_id);
        self.next_filter_id += 1;
        self.filters.push(Filter::inert(id));
        vec![SessionEvent::FilterAdded(id)]
    }

    fn update_filter(
        &mut self,
        id: FilterId,
        field: String,
        operator: &str,
        value: String,
    ) -> Vec<SessionEvent> {
        let Some(filter) = self.filters.iter_mut().find(|filter| filter.id == id) else {
            return vec![self.notify(Notification::info(format!("No filter #{id}")))];
        };
        filter.field = field.trim().to_owned();
        filter.op = FilterOp::parse(operator);
        filter.value = value;
        debug!(filter = %filter, "filter updated");

        let mut events = vec![SessionEvent::FilterUpdated(id)];
        if !self.records.is_empty() {
            events.extend(self.recompute());
        }
        events
    }

    fn remove_filter(&mut self, id: FilterId) -> Vec<SessionEvent> {
        let before = self.filters.len();
        self.filters.retain(|filter| filter.id != id);
        if self.filters.len() == before {
            return vec![self.notify(Notification::info(format!("No filter #{id}")))];
        }

        let mut events = vec![SessionEvent::FilterRemoved(id)];
        if !self.records.is_empty() {
            events.extend(self.recompute());
        }
        events
    }

    fn apply_filters(&mut self) -> Vec<SessionEvent> {
        if self.records.is_empty() {
            return vec![self.notify(Notification::info("No records to filter"))];
        }
        self.recompute()
    }

    fn clear_filters(&mut self) -> Vec<SessionEvent> {
        self.filters.clear();
        let mut events = vec![SessionEvent::FiltersCleared];
        if !self.records.is_empty() {
            events.extend(self.recompute());
        }
        events
    }

    fn search(&mut self, query: String) -> Vec<SessionEvent> {
        if self.records.is_empty() {
            return vec![self.notify(Notification::info("No records to search"))];
        }
        self.search_query = query;
        self.refresh_displayed();
        vec![self.results_changed()]
    }

    fn toggle_expanded(&mut self, id: &RecordId) -> Vec<SessionEvent> {
        let Some(record) = self.record(id) else {
            return vec![self.notify(Notification::info(format!("No record {id}")))];
        };
        let updated = Record {
            expanded: !record.expanded,
            ..Record::clone(record)
        };
        self.replace_record(updated);
        vec![SessionEvent::RecordChanged(id.clone())]
    }

    fn search_record_fields(&mut self, id: &RecordId, query: &str) -> Vec<SessionEvent> {
        let Some(record) = self.record(id) else {
            return vec![self.notify(Notification::info(format!("No record {id}")))];
        };
        let updated = search_record_fields(record, query);
        self.replace_record(updated);
        vec![SessionEvent::RecordChanged(id.clone())]
    }

    /// Swaps one record in every snapshot that holds it; membership is untouched.
    fn replace_record(&mut self, updated: Record) {
        let updated = Arc::new(updated);
        let swap = |snapshot: &[Arc<Record>]| {
            snapshot
                .iter()
                .map(|record| {
                    if record.id == updated.id {
                        Arc::clone(&updated)
                    } else {
                        Arc::clone(record)
                    }
                })
                .collect::<Vec<_>>()
        };
        self.records = swap(&self.records);
        self.filtered = swap(&self.filtered);
        self.displayed = swap(&self.displayed);
    }

    fn recompute(&mut self) -> Vec<SessionEvent> {
        self.filtered = apply_filters(&self.records, &self.filters);
        self.refresh_displayed();
        vec![self.results_changed()]
    }

    fn refresh_displayed(&mut self) {
        let source = if has_active_filters(&self.filters) {
            &self.filtered
        } else {
            &self.records
        };
        self.displayed = apply_search(source, &self.search_query);
        self.no_results = self.displayed.is_empty();
        debug!(
            total = self.records.len(),
            filtered = self.filtered.len(),
            displayed = self.displayed.len(),
            "results recomputed"
        );
    }

    fn results_changed(&self) -> SessionEvent {
        SessionEvent::ResultsChanged {
            total: self.records.len(),
            filtered: self.filtered.len(),
            displayed: self.displayed.len(),
        }
    }

    fn reset(&mut self) {
        self.selected_type = None;
        self.selected_fields.clear();
        self.filters.clear();
        self.search_query.clear();
        self.records.clear();
        self.filtered.clear();
        self.displayed.clear();
        self.no_results = false;
    }

    fn notify(&mut self, notification: Notification) -> SessionEvent {
        self.notifications.push(notification.clone());
        SessionEvent::Notified(notification)
    }
}
