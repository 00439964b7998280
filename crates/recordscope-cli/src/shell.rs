// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use recordscope_app::{
    Debouncer, FilterId, RecordId, RecordSource, Session, SessionCommand, SessionEvent,
    field_options,
};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Types,
    Type(String),
    ListFields,
    SelectFields(Vec<String>),
    Reload,
    Fetch,
    FilterAdd,
    FilterSet {
        id: FilterId,
        field: String,
        operator: String,
        value: String,
    },
    FilterRemove(FilterId),
    FilterApply,
    FilterClear,
    FilterList,
    Search(String),
    Expand(RecordId),
    Find {
        id: RecordId,
        query: String,
    },
    Show,
    Help,
    Quit,
}

/// Parses one shell line. Blank lines and `#` comments yield `None`.
pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = split_word(line);

    let command = match word {
        "types" => ShellCommand::Types,
        "type" => {
            if rest.is_empty() {
                bail!("type requires a record type name");
            }
            ShellCommand::Type(rest.to_owned())
        }
        "fields" if rest.is_empty() => ShellCommand::ListFields,
        "fields" => ShellCommand::SelectFields(split_field_list(rest)),
        "reload" => ShellCommand::Reload,
        "fetch" => ShellCommand::Fetch,
        "filter" => parse_filter_command(rest)?,
        "search" => ShellCommand::Search(rest.to_owned()),
        "expand" => ShellCommand::Expand(parse_record_id(rest, "expand")?),
        "find" => {
            let (id, query) = split_word(rest);
            ShellCommand::Find {
                id: parse_record_id(id, "find")?,
                query: query.to_owned(),
            }
        }
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        unknown => bail!("unknown command {unknown:?}; type `help` to list commands"),
    };
    Ok(Some(command))
}

fn parse_filter_command(rest: &str) -> Result<ShellCommand> {
    let (action, rest) = split_word(rest);
    let command = match action {
        "add" => ShellCommand::FilterAdd,
        "apply" => ShellCommand::FilterApply,
        "clear" => ShellCommand::FilterClear,
        "" | "list" => ShellCommand::FilterList,
        "rm" | "remove" => ShellCommand::FilterRemove(parse_filter_id(rest)?),
        "set" => {
            let (id, rest) = split_word(rest);
            let id = parse_filter_id(id)?;
            let (field, rest) = split_word(rest);
            let (operator, value) = split_word(rest);
            if operator.is_empty() {
                bail!("filter set requires <id> <field> <op> [value]");
            }
            ShellCommand::FilterSet {
                id,
                field: field.to_owned(),
                operator: operator.to_owned(),
                value: value.to_owned(),
            }
        }
        unknown => {
            bail!("unknown filter action {unknown:?}; use add, set, rm, apply, clear, or list")
        }
    };
    Ok(command)
}

fn parse_filter_id(raw: &str) -> Result<FilterId> {
    let raw = raw.trim().trim_start_matches('#');
    raw.parse::<u64>()
        .map(FilterId::new)
        .map_err(|_| anyhow!("expected a filter number, got {raw:?}"))
}

fn parse_record_id(raw: &str, command: &str) -> Result<RecordId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("{command} requires a record id");
    }
    Ok(RecordId::new(raw))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

pub fn split_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Line-driven front end over a [`Session`]. Search lines are debounced:
/// a burst of them dispatches only the last query.
pub struct Shell<'a, S: RecordSource + ?Sized> {
    session: &'a mut Session,
    source: &'a mut S,
    pending_search: Debouncer<String>,
}

impl<'a, S: RecordSource + ?Sized> Shell<'a, S> {
    pub fn new(session: &'a mut Session, source: &'a mut S, debounce: Duration) -> Self {
        Self {
            session,
            source,
            pending_search: Debouncer::new(debounce),
        }
    }

    pub fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        self.run_lines(spawn_line_reader(input), out)
    }

    /// Drives the session from `lines`. While a search is pending the wait
    /// for input is bounded by its deadline, so an idle shell still releases
    /// it.
    fn run_lines<W: Write>(
        &mut self,
        lines: Receiver<io::Result<String>>,
        out: &mut W,
    ) -> Result<()> {
        let events = self
            .session
            .dispatch(&mut *self.source, SessionCommand::LoadObjectTypes);
        self.report(out, &events)?;

        loop {
            let received = match self.pending_search.deadline() {
                Some(deadline) => {
                    lines.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let line = match received {
                Ok(line) => line?,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(query) = self.pending_search.poll(Instant::now()) {
                        self.search(out, query)?;
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let now = Instant::now();
            if let Some(query) = self.pending_search.poll(now) {
                self.search(out, query)?;
            }

            let command = match parse_shell_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    writeln!(out, "error: {err:#}")?;
                    continue;
                }
            };
            if let ShellCommand::Search(query) = command {
                self.pending_search.push(query, now);
                continue;
            }
            if let Some(query) = self.pending_search.flush() {
                self.search(out, query)?;
            }
            if !self.execute(out, command)? {
                return Ok(());
            }
        }

        if let Some(query) = self.pending_search.flush() {
            self.search(out, query)?;
        }
        Ok(())
    }

    /// Runs one command; `false` means the shell should stop.
    fn execute<W: Write>(&mut self, out: &mut W, command: ShellCommand) -> Result<bool> {
        let session_command = match command {
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Help => {
                write_help(out)?;
                return Ok(true);
            }
            ShellCommand::Show => {
                render::write_results(out, self.session)?;
                return Ok(true);
            }
            ShellCommand::Types => {
                render::write_object_types(out, self.session.object_types())?;
                return Ok(true);
            }
            ShellCommand::ListFields => {
                match self.session.field_catalog() {
                    Some(catalog) => render::write_field_options(out, &field_options(catalog))?,
                    None => writeln!(out, "info: Select a record type first")?,
                }
                return Ok(true);
            }
            ShellCommand::FilterList => {
                render::write_filters(out, self.session.filters())?;
                return Ok(true);
            }
            ShellCommand::Search(query) => SessionCommand::Search(query),
            ShellCommand::Type(name) => SessionCommand::SelectType(name),
            ShellCommand::SelectFields(names) => SessionCommand::SelectFields(names),
            ShellCommand::Reload => SessionCommand::ReloadFields,
            ShellCommand::Fetch => SessionCommand::FetchRecords,
            ShellCommand::FilterAdd => SessionCommand::AddFilter,
            ShellCommand::FilterSet {
                id,
                field,
                operator,
                value,
            } => SessionCommand::UpdateFilter {
                id,
                field,
                operator,
                value,
            },
            ShellCommand::FilterRemove(id) => SessionCommand::RemoveFilter(id),
            ShellCommand::FilterApply => SessionCommand::ApplyFilters,
            ShellCommand::FilterClear => SessionCommand::ClearFilters,
            ShellCommand::Expand(id) => SessionCommand::ToggleExpanded(id),
            ShellCommand::Find { id, query } => SessionCommand::SearchRecordFields { id, query },
        };

        let events = self.session.dispatch(&mut *self.source, session_command);
        self.report(out, &events)?;
        Ok(true)
    }

    fn search<W: Write>(&mut self, out: &mut W, query: String) -> Result<()> {
        debug!(query = %query, "debounced search released");
        let events = self
            .session
            .dispatch(&mut *self.source, SessionCommand::Search(query));
        self.report(out, &events)
    }

    fn report<W: Write>(&mut self, out: &mut W, events: &[SessionEvent]) -> Result<()> {
        for notification in self.session.take_notifications() {
            render::write_notification(out, &notification)?;
        }
        for event in events {
            match event {
                SessionEvent::ObjectTypesLoaded(count) => {
                    writeln!(out, "{count} record types")?;
                }
                SessionEvent::FieldsLoaded(count) | SessionEvent::FieldsSelected(count) => {
                    writeln!(out, "{count} fields selected")?;
                }
                SessionEvent::FilterAdded(id) => writeln!(out, "added filter #{id}")?,
                SessionEvent::ResultsChanged { .. } => {
                    render::write_results(out, self.session)?;
                }
                SessionEvent::RecordChanged(id) => {
                    if let Some(record) = self.session.record(id) {
                        render::write_record(out, record)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Reads `input` on a helper thread; the channel closes at end of input.
fn spawn_line_reader<R: BufRead + Send + 'static>(input: R) -> Receiver<io::Result<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn write_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "types                                  list record types")?;
    writeln!(out, "type <name>                            select a record type")?;
    writeln!(out, "fields [a,b,c]                         list or select fields")?;
    writeln!(out, "reload                                 re-read the field catalog")?;
    writeln!(out, "fetch                                  fetch records")?;
    writeln!(out, "filter [list|add|apply|clear]          manage filters")?;
    writeln!(out, "filter set <n> <field> <op> [value]    edit filter #n (=, !=, LIKE)")?;
    writeln!(out, "filter rm <n>                          remove filter #n")?;
    writeln!(out, "search <text>                          search displayed records")?;
    writeln!(out, "expand <id>                            toggle a record's full view")?;
    writeln!(out, "find <id> <text>                       search one record's fields")?;
    writeln!(out, "show | help | quit")?;
    Ok(())
}
