//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`Command`] - One line of input in interactive mode
//!
//! # Parsing interactive commands
//!
//! ```rust
//! use tsvgrid::cli::Command;
//!
//! assert_eq!(
//!     "facet b Activo".parse::<Command>().unwrap(),
//!     Command::Facet { letter: "b".into(), value: "Activo".into() }
//! );
//! assert_eq!("export".parse::<Command>().unwrap(), Command::Export(String::new()));
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::core::SortOrder;

/// Filter a published spreadsheet like a grid and export a dated CSV subset.
#[derive(Parser, Debug, Clone)]
#[command(name = "tsvgrid")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    tsvgrid students.tsv --facets
    tsvgrid students.tsv -s maria --facet B=Activo
    tsvgrid students.tsv --export --since 2026-01-15 -o exports/
    tsvgrid https://docs.example.com/pub?output=tsv --interactive
    tsvgrid --config grid.json --detail 12")]
pub struct Args {
    /// TSV file path or http(s) URL (default: `source_url` from the config)
    pub input: Option<String>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Free-text search (accent- and case-insensitive)
    #[arg(short, long, value_name = "QUERY")]
    pub search: Option<String>,

    /// Exact-match facet filter, repeatable
    #[arg(long = "facet", value_name = "LETTER=VALUE", value_parser = parse_facet_arg)]
    pub facet: Vec<(String, String)>,

    /// Sheet-order direction for listed rows
    #[arg(long, value_name = "asc|desc", default_value = "asc")]
    pub order: SortOrder,

    /// Export lower bound (YYYY-MM-DD, or any date form a cell may hold);
    /// only rows dated on or after it
    #[arg(long, value_name = "DATE")]
    pub since: Option<String>,

    /// Write the visible rows to a CSV file
    #[arg(long)]
    pub export: bool,

    /// Directory for exported files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the options offered by each facet
    #[arg(long = "facets")]
    pub show_facets: bool,

    /// Maximum number of rows to print
    #[arg(long, value_name = "N", default_value_t = 20)]
    pub limit: usize,

    /// Print every field of the row with this sheet order
    #[arg(long, value_name = "N")]
    pub detail: Option<usize>,

    /// Read commands from stdin after the initial load
    #[arg(short, long)]
    pub interactive: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parses `LETTER=VALUE`. The value may be empty, which clears the facet.
pub fn parse_facet_arg(s: &str) -> Result<(String, String), String> {
    let (letter, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LETTER=VALUE, got '{}'", s))?;
    let letter = letter.trim();
    if letter.is_empty() {
        return Err(format!("missing column letter in '{}'", s));
    }
    Ok((letter.to_string(), value.to_string()))
}

/// One interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ClearSearch,
    /// An empty value clears the facet
    Facet { letter: String, value: String },
    Clear,
    Order(SortOrder),
    /// Print up to `n` visible rows
    Show(Option<usize>),
    Facets,
    Detail(usize),
    /// Raw lower bound; empty means no bound
    Export(String),
    Reload,
    Help,
    Quit,
}

impl Command {
    /// Short usage text for interactive mode.
    pub fn help() -> &'static str {
        "Commands:
    search <text>        filter rows containing text
    clear-search         drop the text filter
    facet <L> [value]    exact filter on column L (no value clears it)
    clear                drop every filter
    asc | desc           sheet-order direction
    show [n]             list visible rows
    facets               list facet options
    detail <n>           show every field of row n
    export [date]        write visible rows dated on or after date
    reload               fetch the document again, keeping filters
    quit"
    }
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word.to_lowercase().as_str() {
            "search" | "s" => Ok(Command::Search(rest.to_string())),
            "clear-search" => Ok(Command::ClearSearch),
            "facet" | "f" => {
                let (letter, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(l, v)| (l, v.trim()))
                    .unwrap_or((rest, ""));
                if letter.is_empty() {
                    return Err("usage: facet <letter> [value]".to_string());
                }
                Ok(Command::Facet {
                    letter: letter.to_string(),
                    value: value.to_string(),
                })
            }
            "clear" => Ok(Command::Clear),
            "asc" => Ok(Command::Order(SortOrder::Ascending)),
            "desc" => Ok(Command::Order(SortOrder::Descending)),
            "show" | "ls" => {
                if rest.is_empty() {
                    return Ok(Command::Show(None));
                }
                rest.parse()
                    .map(|n| Command::Show(Some(n)))
                    .map_err(|_| format!("not a row count: '{}'", rest))
            }
            "facets" => Ok(Command::Facets),
            "detail" | "d" => rest
                .parse()
                .map(Command::Detail)
                .map_err(|_| "usage: detail <sheet order>".to_string()),
            "export" | "e" => Ok(Command::Export(rest.to_string())),
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}
