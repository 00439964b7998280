// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod render;
mod runtime;
mod shell;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use recordscope_app::{
    NotificationKind, RecordId, Session, SessionCommand, SessionEvent, field_options,
};
use recordscope_db::Store;
use runtime::DbRuntime;
use shell::{Shell, split_field_list};
use std::env;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RECORDSCOPE_LOG";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    init_logging();

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `recordscope --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        match &options.db_path {
            Some(path) => path.clone(),
            None => config.db_path()?,
        }
    };
    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, pass --db or set [storage].db_path or RECORDSCOPE_DB_PATH",
            db_path.display()
        )
    })?;
    if options.demo {
        store.seed_demo_data()?;
    }
    info!(db = %db_path.display(), demo = options.demo, "opened record store");

    let mut runtime = DbRuntime::new(&store);
    let mut session = Session::new(config.page_size());

    if options.interactive {
        let mut stdout = io::stdout();
        return Shell::new(&mut session, &mut runtime, config.search_debounce()?)
            .run(BufReader::new(io::stdin()), &mut stdout);
    }

    let mut stdout = io::stdout().lock();
    browse(&options, &mut session, &mut runtime, &mut stdout)
}

/// One-shot browse: every flag becomes a session command, applied in the
/// order a user would click through them.
fn browse<W: Write>(
    options: &CliOptions,
    session: &mut Session,
    runtime: &mut DbRuntime<'_>,
    out: &mut W,
) -> Result<()> {
    dispatch(session, runtime, SessionCommand::LoadObjectTypes)?;
    if options.list_types {
        if options.json {
            writeln!(out, "{}", serde_json::to_string_pretty(session.object_types())?)?;
        } else {
            render::write_object_types(out, session.object_types())?;
        }
        return Ok(());
    }

    let Some(object_type) = &options.object_type else {
        bail!(
            "pass --type <name> to browse records; available types: {}",
            session.object_types().join(", ")
        );
    };
    dispatch(session, runtime, SessionCommand::SelectType(object_type.clone()))?;

    if options.list_fields {
        let catalog = session.field_catalog().unwrap_or_default();
        let options_sorted = field_options(catalog);
        if options.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&options_sorted)?)?;
        } else {
            render::write_field_options(out, &options_sorted)?;
        }
        return Ok(());
    }

    if let Some(fields) = &options.fields {
        dispatch(session, runtime, SessionCommand::SelectFields(fields.clone()))?;
    }
    dispatch(session, runtime, SessionCommand::FetchRecords)?;

    for spec in &options.filters {
        let events = dispatch(session, runtime, SessionCommand::AddFilter)?;
        let id = events
            .iter()
            .find_map(|event| match event {
                SessionEvent::FilterAdded(id) => Some(*id),
                _ => None,
            })
            .ok_or_else(|| anyhow!("filter {spec:?} was not added"))?;
        dispatch(
            session,
            runtime,
            SessionCommand::UpdateFilter {
                id,
                field: spec.field.clone(),
                operator: spec.operator.clone(),
                value: spec.value.clone(),
            },
        )?;
    }

    if let Some(query) = &options.search {
        dispatch(session, runtime, SessionCommand::Search(query.clone()))?;
    }

    if let Some(id) = &options.expand {
        let id = RecordId::new(id.as_str());
        dispatch(session, runtime, SessionCommand::ToggleExpanded(id.clone()))?;
        if let Some(query) = &options.field_search {
            dispatch(
                session,
                runtime,
                SessionCommand::SearchRecordFields {
                    id,
                    query: query.clone(),
                },
            )?;
        }
    }

    if options.json {
        writeln!(out, "{}", render::results_json(session)?)?;
    } else {
        render::write_results(out, session)?;
    }
    Ok(())
}

/// Dispatches one command and prints its notifications to stderr. Error
/// notifications end the run.
fn dispatch(
    session: &mut Session,
    runtime: &mut DbRuntime<'_>,
    command: SessionCommand,
) -> Result<Vec<SessionEvent>> {
    let events = session.dispatch(runtime, command);
    let mut stderr = io::stderr();
    let mut failure = None;
    for notification in session.take_notifications() {
        render::write_notification(&mut stderr, &notification)?;
        if notification.kind == NotificationKind::Error {
            failure = Some(notification.message);
        }
    }
    if let Some(message) = failure {
        bail!(message);
    }
    Ok(events)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterSpec {
    field: String,
    operator: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    db_path: Option<PathBuf>,
    demo: bool,
    list_types: bool,
    object_type: Option<String>,
    list_fields: bool,
    fields: Option<Vec<String>>,
    filters: Vec<FilterSpec>,
    search: Option<String>,
    expand: Option<String>,
    field_search: Option<String>,
    json: bool,
    interactive: bool,
    print_config_path: bool,
    print_example: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        db_path: None,
        demo: false,
        list_types: false,
        object_type: None,
        list_fields: false,
        fields: None,
        filters: Vec::new(),
        search: None,
        expand: None,
        field_search: None,
        json: false,
        interactive: false,
        print_config_path: false,
        print_example: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let path = flag_value(&mut iter, "--config", "a file path")?;
                options.config_path = PathBuf::from(path);
            }
            "--db" => {
                let path = flag_value(&mut iter, "--db", "a database path")?;
                recordscope_db::validate_db_path(&path)?;
                options.db_path = Some(PathBuf::from(path));
            }
            "--demo" => options.demo = true,
            "--list-types" => options.list_types = true,
            "--type" => {
                options.object_type = Some(flag_value(&mut iter, "--type", "a record type name")?);
            }
            "--list-fields" => options.list_fields = true,
            "--fields" => {
                let raw = flag_value(&mut iter, "--fields", "a comma-separated list")?;
                let fields = split_field_list(&raw);
                if fields.is_empty() {
                    bail!("--fields requires at least one field name");
                }
                options.fields = Some(fields);
            }
            "--filter" => {
                let raw = flag_value(&mut iter, "--filter", "\"<field> <op> <value>\"")?;
                options.filters.push(parse_filter_spec(&raw)?);
            }
            "--search" => {
                options.search = Some(flag_value(&mut iter, "--search", "a query")?);
            }
            "--expand" => {
                options.expand = Some(flag_value(&mut iter, "--expand", "a record id")?);
            }
            "--field-search" => {
                options.field_search = Some(flag_value(&mut iter, "--field-search", "a query")?);
            }
            "--json" => options.json = true,
            "--interactive" | "-i" => options.interactive = true,
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.field_search.is_some() && options.expand.is_none() {
        bail!("--field-search requires --expand <id> to name the record to search");
    }
    Ok(options)
}

fn flag_value<I, S>(iter: &mut I, flag: &str, what: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

/// Splits `"<field> <op> <value>"`; the value keeps inner spaces and may be
/// empty.
fn parse_filter_spec(raw: &str) -> Result<FilterSpec> {
    let raw = raw.trim();
    let (field, rest) = raw
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("--filter {raw:?} needs a field and an operator"))?;
    let rest = rest.trim_start();
    let (operator, value) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    if operator.is_empty() {
        bail!("--filter {raw:?} needs an operator (=, !=, LIKE)");
    }
    Ok(FilterSpec {
        field: field.to_owned(),
        operator: operator.to_owned(),
        value: value.trim().to_owned(),
    })
}

fn print_help() {
    println!("recordscope");
    println!("  --config <path>          Use a specific config path");
    println!("  --db <path>              Use a specific database file");
    println!("  --demo                   Browse seeded demo data (in-memory)");
    println!("  --list-types             List record types");
    println!("  --type <name>            Record type to browse");
    println!("  --list-fields            List the selected type's fields");
    println!("  --fields <a,b,c>         Fields to fetch (default: all)");
    println!("  --filter \"<f> <op> <v>\"  Add a filter; op is =, !=, or LIKE (repeatable)");
    println!("  --search <text>          Search fetched records");
    println!("  --expand <id>            Show every field of one record");
    println!("  --field-search <text>    Narrow the expanded record's fields");
    println!("  --json                   Print JSON instead of text");
    println!("  --interactive, -i        Read commands from stdin");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --help                   Show this help");
    println!();
    println!("Set {LOG_ENV}=debug for diagnostic logs on stderr.");
}
