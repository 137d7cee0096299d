//! Property-based tests for tsvgrid.
//!
//! These tests generate random documents and inputs to find edge cases.

use std::sync::Arc;

use proptest::prelude::*;

use tsvgrid::core::{
    Column, ExportOutcome, ExportRequest, FacetSpec, FilterEngine, Row, build_csv,
    letter_to_index, normalize,
};
use tsvgrid::parsing::{parse_cell_date, parse_tsv};

/// Cell values, including blanks, padding and characters CSV must quote.
fn arb_cell() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        String::new(),
        "   ".to_string(),
        "Ana".to_string(),
        "  María  José ".to_string(),
        "ÁLVARO".to_string(),
        "Activo".to_string(),
        "Activo extra".to_string(),
        "10".to_string(),
        "He said \"hi\", ok".to_string(),
        "a,b".to_string(),
        "2026-01-10".to_string(),
        "01/02/2026".to_string(),
        "🎉 emoji".to_string(),
    ])
}

/// A raw line with 0..6 tab-separated cells.
fn arb_line() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_cell(), 0..6).prop_map(|cells| cells.join("\t"))
}

/// A raw document, mixing `\n` and `\r\n` endings.
fn arb_document() -> impl Strategy<Value = String> {
    prop::collection::vec((arb_line(), any::<bool>()), 0..15).prop_map(|lines| {
        lines
            .into_iter()
            .map(|(line, crlf)| if crlf { line + "\r\n" } else { line + "\n" })
            .collect()
    })
}

/// Text over an alphabet with accents, mixed case and whitespace runs.
fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            'a', 'A', 'e', 'n', 'Z', 'á', 'Á', 'é', 'ñ', 'Ñ', 'ü', 'Ü', 'ç', ' ', '\t', '1',
        ]),
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// A date cell: ISO, day-first, blank or garbage.
fn arb_date_cell() -> impl Strategy<Value = String> {
    (1u32..=28, 1u32..=12, 2020i32..=2027, 0u8..4).prop_map(|(d, m, y, style)| match style {
        0 => format!("{y:04}-{m:02}-{d:02}"),
        1 => format!("{d}/{m}/{y}"),
        2 => String::new(),
        _ => "sin fecha".to_string(),
    })
}

/// Spreadsheet letters for a 1-based index.
fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        out.push(char::from(b'A' + ((n - 1) % 26) as u8));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // PARSER PROPERTIES
    // ============================================

    /// Every row is as wide as the header and none is entirely blank
    #[test]
    fn parsed_tables_are_rectangular(doc in arb_document()) {
        let table = parse_tsv(&doc);
        for row in table.rows() {
            prop_assert_eq!(row.cells().len(), table.width());
            prop_assert!(row.cells()[1..].iter().any(|c| !c.is_empty()));
        }
    }

    /// Sheet order is exactly 0..k
    #[test]
    fn sheet_order_is_dense(doc in arb_document()) {
        let table = parse_tsv(&doc);
        for (i, row) in table.rows().iter().enumerate() {
            prop_assert_eq!(row.order(), i);
            prop_assert_eq!(row.cell(0), i.to_string());
        }
    }

    /// Cells are always trimmed
    #[test]
    fn cells_are_trimmed(doc in arb_document()) {
        let table = parse_tsv(&doc);
        for row in table.rows() {
            for cell in &row.cells()[1..] {
                prop_assert_eq!(cell.trim(), cell.as_str());
            }
        }
    }

    /// Parser never panics on arbitrary text
    #[test]
    fn parser_never_panics(text in ".{0,200}") {
        let _ = parse_tsv(&text);
    }

    // ============================================
    // COLUMN PROPERTIES
    // ============================================

    /// Letters map back to their index and order is preserved
    #[test]
    fn letter_to_index_is_monotonic(n in 1usize..20_000) {
        prop_assert_eq!(letter_to_index(&letters(n)), n);
        prop_assert!(letter_to_index(&letters(n)) < letter_to_index(&letters(n + 1)));
        prop_assert_eq!(
            letter_to_index(&letters(n).to_lowercase()),
            letter_to_index(&letters(n))
        );
    }

    // ============================================
    // NORMALIZATION PROPERTIES
    // ============================================

    /// normalize is idempotent
    #[test]
    fn normalize_is_idempotent(text in arb_text()) {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
        prop_assert!(!once.contains("  "));
    }

    // ============================================
    // FILTER PROPERTIES
    // ============================================

    /// A facet never matches a longer cell that merely contains its value,
    /// while the free-text search does
    #[test]
    fn facet_is_exact_search_is_substring(value in "[a-z]{1,8}", suffix in "[a-z]{1,8}") {
        let doc = format!("Name\tStatus\nx\t{value} {suffix}\ny\t{value}\n");
        let table = Arc::new(parse_tsv(&doc));
        let mut engine = FilterEngine::new(table, &[FacetSpec::new("B", "Status")]).unwrap();

        engine.set_facet("B", &value).unwrap();
        let facet_hits: Vec<&str> = engine.visible_rows().iter().map(|r| r.cell(1)).collect();
        prop_assert_eq!(facet_hits, vec!["y"]);

        engine.clear_all();
        engine.set_query(&value);
        prop_assert_eq!(engine.visible_rows().len(), 2);
    }

    /// Filtering only ever removes rows, and clearing restores all of them
    #[test]
    fn filters_are_subsets(doc in arb_document(), query in arb_text(), pick in 0usize..8) {
        let table = Arc::new(parse_tsv(&doc));
        let total = table.rows().len();
        let mut engine = FilterEngine::new(table, &[FacetSpec::new("B", "B")]).unwrap();

        engine.set_query(&query);
        let after_query = engine.visible_rows().len();
        prop_assert!(after_query <= total);

        let options = engine.facet_options("B").unwrap();
        if let Some(option) = options.get(pick % options.len().max(1)) {
            engine.set_facet("B", option).unwrap();
            prop_assert!(engine.visible_rows().len() <= after_query);
            prop_assert!(!engine.visible_rows().is_empty());
        }

        engine.clear_all();
        prop_assert_eq!(engine.visible_rows().len(), total);
    }

    // ============================================
    // EXPORT PROPERTIES
    // ============================================

    /// Exported rows are on or after the bound and sorted newest first
    #[test]
    fn export_respects_bound_and_order(
        dates in prop::collection::vec(arb_date_cell(), 1..20),
        bound in prop::option::of(arb_date_cell()),
    ) {
        let mut doc = String::from("Id\tDate\n");
        for (i, date) in dates.iter().enumerate() {
            doc.push_str(&format!("{i}\t{date}\n"));
        }
        let table = parse_tsv(&doc);
        let rows: Vec<&Row> = table.rows().iter().collect();

        let min_date = bound.as_deref().and_then(parse_cell_date);
        let request = ExportRequest::new(
            vec![Column::parse("B").unwrap()],
            Column::parse("B").unwrap(),
        )
        .with_min_date(min_date);

        match build_csv(&table, &rows, &request).unwrap() {
            ExportOutcome::Csv(export) => {
                let parsed: Vec<Option<_>> = export
                    .csv
                    .lines()
                    .skip(1)
                    .map(parse_cell_date)
                    .collect();
                prop_assert_eq!(parsed.len(), export.rows);
                prop_assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
                if let Some(min) = min_date {
                    prop_assert!(parsed.iter().all(|d| d.is_some_and(|d| d >= min)));
                }
            }
            ExportOutcome::Empty => {
                let min = min_date.unwrap();
                prop_assert!(dates
                    .iter()
                    .all(|d| parse_cell_date(d).is_none_or(|d| d < min)));
            }
        }
    }

    /// CSV output reads back as the projected, trimmed cells
    #[test]
    fn export_csv_reads_back(lines in prop::collection::vec(arb_line(), 1..10)) {
        let doc = format!("A\tB\tC\tD\tE\n{}", lines.join("\n"));
        let table = parse_tsv(&doc);
        let rows: Vec<&Row> = table.rows().iter().collect();
        let columns: Vec<Column> = ["C", "A", "E"].iter().map(|l| Column::parse(l).unwrap()).collect();
        let request = ExportRequest::new(columns.clone(), Column::parse("Z").unwrap());

        let outcome = build_csv(&table, &rows, &request).unwrap();
        let ExportOutcome::Csv(export) = outcome else {
            prop_assert!(rows.is_empty());
            return Ok(());
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(export.csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|record| record.unwrap()).collect();
        prop_assert_eq!(records.len(), rows.len());
        for (record, row) in records.iter().zip(&rows) {
            let expected: Vec<&str> = columns.iter().map(|c| row.cell(c.index())).collect();
            prop_assert_eq!(record.iter().collect::<Vec<_>>(), expected);
        }
    }

    /// The whole pipeline is deterministic
    #[test]
    fn pipeline_is_deterministic(doc in arb_document(), query in arb_text()) {
        let run = || {
            let table = Arc::new(parse_tsv(&doc));
            let mut engine = FilterEngine::new(table.clone(), &[]).unwrap();
            engine.set_query(&query);
            let request = ExportRequest::new(
                vec![Column::parse("A").unwrap(), Column::parse("B").unwrap()],
                Column::parse("B").unwrap(),
            );
            build_csv(&table, &engine.visible_rows(), &request).unwrap()
        };
        prop_assert_eq!(run(), run());
    }
}
