//! # tsvgrid CLI
//!
//! Command-line interface for the tsvgrid library.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use tsvgrid::GridError;
use tsvgrid::cli::{Args, Command};
use tsvgrid::config::GridConfig;
use tsvgrid::core::Debouncer;
use tsvgrid::session::{Action, Effect, LoadOutcome, Session};
use tsvgrid::source::Source;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays clean for status lines.
/// `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "tsvgrid=debug",
        _ => "tsvgrid=trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), GridError> {
    let config = match &args.config {
        Some(path) => GridConfig::from_json_file(path)?,
        None => GridConfig::default(),
    };
    let source = args
        .input
        .as_deref()
        .or(config.source_url.as_deref())
        .map(Source::from_input)
        .ok_or(GridError::NoSource)?;
    let debounce = config.search_debounce();

    println!("📦 tsvgrid v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Source:  {}", source);
    if let Some(path) = &args.config {
        println!("⚙️  Config:  {}", path.display());
    }
    println!();

    let mut session = Session::new(config)?;

    println!("⏳ Loading...");
    let load_start = Instant::now();
    let outcome = load(&mut session, &source, false)?;
    print_loaded(outcome, load_start.elapsed());

    apply_args(&mut session, args)?;

    if args.show_facets {
        print_facets(&mut session);
    }
    print_rows(&session, args.limit);

    if let Some(order) = args.detail {
        print_detail(&session, order);
    }

    if args.export {
        export(&session, args.since.as_deref().unwrap_or(""), &args.output_dir)?;
    }

    if args.interactive {
        repl(&mut session, &source, args, debounce);
    }

    Ok(())
}

fn load(
    session: &mut Session,
    source: &Source,
    preserve_filters: bool,
) -> Result<LoadOutcome, GridError> {
    let ticket = session.begin_load();
    session.finish_load(ticket, source.load(), preserve_filters)
}

fn print_loaded(outcome: LoadOutcome, elapsed: Duration) {
    match outcome {
        LoadOutcome::Loaded { rows, columns } => println!(
            "   Loaded {} rows × {} columns ({:.2}s)",
            rows,
            columns.saturating_sub(1),
            elapsed.as_secs_f64()
        ),
        LoadOutcome::Stale => println!("   Superseded by a newer load"),
    }
}

/// Applies the one-shot filters given on the command line.
fn apply_args(session: &mut Session, args: &Args) -> Result<(), GridError> {
    if let Some(query) = &args.search {
        session.dispatch(Action::Search(query.clone()))?;
        println!("🔍 Search:  {}", query);
    }

    for (letter, value) in &args.facet {
        session.dispatch(Action::SetFacet {
            letter: letter.clone(),
            value: value.clone(),
        })?;
    }
    session.dispatch(Action::Order(args.order))?;

    // Selections that match nothing offered are dropped by the refresh.
    session.facet_options();
    if let Some(engine) = session.engine() {
        for (letter, value) in &args.facet {
            if value.trim().is_empty() {
                continue;
            }
            match engine.facet_value(letter) {
                Some(kept) => println!("🏷️  Facet {}: {}", letter.to_uppercase(), kept),
                None => println!(
                    "⚠️  Facet {}: '{}' is not among the offered values, ignored",
                    letter.to_uppercase(),
                    value
                ),
            }
        }
    }
    Ok(())
}

fn print_rows(session: &Session, limit: usize) {
    let Some(table) = session.table() else {
        return;
    };
    let rows = session.visible_rows();
    let columns = session.display_columns();

    println!();
    println!(
        "📋 Showing {} of {} rows ({})",
        rows.len().min(limit),
        rows.len(),
        session.order()
    );
    if rows.is_empty() {
        return;
    }

    let header: Vec<_> = columns.iter().map(|&i| table.header(i)).collect();
    println!("   # | {}", header.join(" | "));
    for row in rows.iter().take(limit) {
        let cells: Vec<&str> = columns.iter().map(|&i| row.cell(i)).collect();
        println!("   {} | {}", row.order(), cells.join(" | "));
    }
    if rows.len() > limit {
        println!("   … {} more", rows.len() - limit);
    }
    println!("   Total: {} loaded, {} visible", table.rows().len(), rows.len());
}

fn print_facets(session: &mut Session) {
    println!();
    for facet in session.facet_options() {
        let selected = facet.selected.as_deref().unwrap_or("(any)");
        println!("🏷️  {} [{}] = {}", facet.label, facet.letter, selected);
        for option in &facet.options {
            println!("   • {}", option);
        }
    }
}

fn print_detail(session: &Session, order: usize) {
    println!();
    let Some(detail) = session.detail(order) else {
        println!("⚠️  No row with sheet order {}", order);
        return;
    };
    println!("👤 {}", detail.title);
    for field in &detail.named {
        let value = if field.value.is_empty() { "—" } else { field.value.as_str() };
        match field.whatsapp() {
            Some(link) => println!("   • {}: {} (WhatsApp: {})", field.name, value, link),
            None => println!("   • {}: {}", field.name, value),
        }
    }
    if !detail.named.is_empty() {
        println!("   ─────");
    }
    for (label, value) in &detail.fields {
        println!("   {}: {}", label, value);
    }
}

fn export(session: &Session, since: &str, output_dir: &Path) -> Result<(), GridError> {
    let today = chrono::Local::now().date_naive();
    match session.export(since, today)? {
        Effect::Download {
            filename,
            csv,
            rows,
        } => {
            fs::create_dir_all(output_dir)?;
            let path = output_dir.join(filename);
            fs::write(&path, csv)?;
            println!();
            println!("✅ Exported {} rows to {}", rows, path.display());
        }
        Effect::Info(message) => {
            println!();
            println!("ℹ️  {}", message);
        }
        Effect::Redraw { .. } => {}
    }
    Ok(())
}

/// Reads commands from stdin until `quit` or end of input.
///
/// Consecutive `search` commands are coalesced: the query is applied once no
/// newer one has arrived for the configured window, or right before any other
/// command runs.
fn repl(session: &mut Session, source: &Source, args: &Args, window: Duration) {
    println!();
    println!("{}", Command::help());

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut pending = Debouncer::new(window);
    loop {
        let received = if pending.is_pending() {
            rx.recv_timeout(pending.window())
        } else {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        };

        let line = match received {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(query) = pending.poll(Instant::now()) {
                    report(session, Action::Search(query), args.limit);
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(query) = pending.flush() {
                    report(session, Action::Search(query), args.limit);
                }
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("⚠️  {}", message);
                continue;
            }
        };

        match command {
            Command::Search(query) => pending.push(query, Instant::now()),
            command => {
                if let Some(query) = pending.flush() {
                    report(session, Action::Search(query), args.limit);
                }
                if command == Command::Quit {
                    break;
                }
                if let Err(e) = execute(session, source, args, command) {
                    println!("❌ {}", e);
                }
            }
        }
    }
}

fn execute(
    session: &mut Session,
    source: &Source,
    args: &Args,
    command: Command,
) -> Result<(), GridError> {
    let action = match command {
        Command::Search(query) => Action::Search(query),
        Command::ClearSearch => Action::ClearSearch,
        Command::Facet { letter, value } => Action::SetFacet { letter, value },
        Command::Clear => Action::ClearFilters,
        Command::Order(order) => Action::Order(order),
        Command::Show(limit) => {
            print_rows(session, limit.unwrap_or(args.limit));
            return Ok(());
        }
        Command::Facets => {
            print_facets(session);
            return Ok(());
        }
        Command::Detail(order) => {
            print_detail(session, order);
            return Ok(());
        }
        Command::Export(since) => return export(session, &since, &args.output_dir),
        Command::Reload => {
            let start = Instant::now();
            match load(session, source, true) {
                Ok(outcome) => print_loaded(outcome, start.elapsed()),
                Err(e) => println!("❌ Reload failed, keeping the current table: {}", e),
            }
            return Ok(());
        }
        Command::Help => {
            println!("{}", Command::help());
            return Ok(());
        }
        Command::Quit => return Ok(()),
    };

    let effect = session.dispatch(action)?;
    print_effect(session, effect, args.limit);
    Ok(())
}

fn report(session: &mut Session, action: Action, limit: usize) {
    match session.dispatch(action) {
        Ok(effect) => print_effect(session, effect, limit),
        Err(e) => println!("❌ {}", e),
    }
}

fn print_effect(session: &Session, effect: Effect, limit: usize) {
    match effect {
        Effect::Redraw {
            facets, status, ..
        } => {
            if let Some(status) = status {
                println!("🧹 {}", status);
            }
            let active: Vec<String> = facets
                .iter()
                .filter_map(|f| f.selected.as_ref().map(|s| format!("{}={}", f.label, s)))
                .collect();
            if !active.is_empty() {
                println!("🏷️  {}", active.join(", "));
            }
            print_rows(session, limit);
        }
        Effect::Info(message) => println!("ℹ️  {}", message),
        Effect::Download { filename, rows, .. } => {
            println!("✅ {} rows ready as {}", rows, filename);
        }
    }
}
