//! End-to-end CLI tests for tsvgrid.
//!
//! These tests run the actual binary against `tests/fixtures/students.tsv`
//! and check its output and the files it writes.
//!
//! # Test Categories
//!
//! - **Basic functionality**: loading, listing, facets, detail
//! - **Filters**: search, facets, order
//! - **Export**: files written, empty results, bad dates
//! - **Interactive**: commands piped through stdin
//! - **Error handling**: missing input, blank documents, bad config
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/students.tsv")
}

fn tsvgrid() -> Command {
    let mut cmd = Command::cargo_bin("tsvgrid").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn exported_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

// ============================================================================
// Basic functionality
// ============================================================================

#[test]
fn test_help() {
    tsvgrid()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--facet <LETTER=VALUE>"))
        .stdout(predicate::str::contains("--since <DATE>"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version() {
    tsvgrid()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_load_and_list() {
    tsvgrid()
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("📦 tsvgrid v"))
        .stdout(predicate::str::contains("Loaded 6 rows × 29 columns"))
        .stdout(predicate::str::contains("📋 Showing 6 of 6 rows (asc)"))
        .stdout(predicate::str::contains("   0 | Activo | María José Pérez | 1001"))
        .stdout(predicate::str::contains("Total: 6 loaded, 6 visible"));
}

#[test]
fn test_blank_column_a_not_listed() {
    tsvgrid()
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("   # | Estado | Nombre del estudiante"))
        .stdout(predicate::str::contains("Código").not());
}

#[test]
fn test_limit() {
    tsvgrid()
        .arg(fixture())
        .args(["--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("📋 Showing 2 of 6 rows"))
        .stdout(predicate::str::contains("… 4 more"));
}

#[test]
fn test_facets_listing() {
    tsvgrid()
        .arg(fixture())
        .arg("--facets")
        .assert()
        .success()
        .stdout(predicate::str::contains("🏷️  Status [B] = (any)"))
        .stdout(predicate::str::contains("   • Pendiente"))
        .stdout(predicate::str::contains("🏷️  Age [E] = (any)"))
        .stdout(predicate::str::contains("   • 12"));
}

#[test]
fn test_detail() {
    tsvgrid()
        .arg(fixture())
        .args(["--detail", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("👤 Andrés Gómez"))
        .stdout(predicate::str::contains("   Teléfono: —"))
        .stdout(predicate::str::contains("   Acudiente: Luis Gómez"));
}

#[test]
fn test_detail_named_fields_and_phone_links() {
    tsvgrid()
        .arg(fixture())
        .args(["--detail", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "   • phone: 300 111 2233 (WhatsApp: https://wa.me/573001112233)",
        ))
        .stdout(predicate::str::contains("   • guardian: Ana Pérez\n"))
        .stdout(predicate::str::contains(
            "   • guardian_phone: 310 222 3344 (WhatsApp: https://wa.me/573102223344)",
        ));

    tsvgrid()
        .arg(fixture())
        .args(["--detail", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("   • phone: —\n"))
        .stdout(predicate::str::contains("   • guardian: Luis Gómez"));
}

#[test]
fn test_detail_missing_row() {
    tsvgrid()
        .arg(fixture())
        .args(["--detail", "99"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No row with sheet order 99"));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_search() {
    tsvgrid()
        .arg(fixture())
        .args(["-s", "LUCIA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("🔍 Search:  LUCIA"))
        .stdout(predicate::str::contains("📋 Showing 1 of 1 rows"))
        .stdout(predicate::str::contains("Lucía Martínez"));
}

#[test]
fn test_facet_filter() {
    tsvgrid()
        .arg(fixture())
        .args(["--facet", "B=retirado"])
        .assert()
        .success()
        .stdout(predicate::str::contains("🏷️  Facet B: Retirado"))
        .stdout(predicate::str::contains("📋 Showing 2 of 2 rows"));
}

#[test]
fn test_facet_not_offered_is_ignored() {
    tsvgrid()
        .arg(fixture())
        .args(["-s", "juan", "--facet", "B=Retirado"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Facet B: 'Retirado' is not among the offered values",
        ))
        .stdout(predicate::str::contains("📋 Showing 1 of 1 rows"));
}

#[test]
fn test_unknown_facet_column_fails() {
    tsvgrid()
        .arg(fixture())
        .args(["--facet", "Q=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column Q is not a facet column"));
}

#[test]
fn test_order_desc() {
    tsvgrid()
        .arg(fixture())
        .args(["--order", "desc", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(desc)"))
        .stdout(predicate::str::contains("   5 | Retirado | Mateo \"Toro\" Díaz"));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_writes_file() {
    let dir = tempdir().unwrap();

    tsvgrid()
        .arg(fixture())
        .args(["--export", "--since", "2026-01-15", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Exported 3 rows to"));

    let files = exported_files(dir.path());
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Inscritos_"), "{name}");
    assert!(name.ends_with("_from_2026-01-15.csv"), "{name}");

    let csv = fs::read_to_string(&files[0]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Código,Nombre del estudiante,"));
    assert!(lines[1].contains("Toro"));
    assert!(lines[3].contains("Juan Camilo Ríos"));
}

#[test]
fn test_export_without_bound_uses_all_token() {
    let dir = tempdir().unwrap();

    tsvgrid()
        .arg(fixture())
        .args(["--export", "--facet", "E=10", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Exported 2 rows"));

    let files = exported_files(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].to_string_lossy().ends_with("_from_all.csv"));
}

#[test]
fn test_export_creates_output_dir() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("exports/march");

    tsvgrid()
        .arg(fixture())
        .args(["--export", "-o"])
        .arg(&nested)
        .assert()
        .success();

    assert_eq!(exported_files(&nested).len(), 1);
}

#[test]
fn test_export_empty_result_is_not_an_error() {
    let dir = tempdir().unwrap();

    tsvgrid()
        .arg(fixture())
        .args(["--export", "--since", "2030-01-01", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ℹ️  No records since 2030-01-01"));

    assert!(exported_files(dir.path()).is_empty());
}

#[test]
fn test_export_invalid_date() {
    let dir = tempdir().unwrap();

    tsvgrid()
        .arg(fixture())
        .args(["--export", "--since", "ayer", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date 'ayer'"));

    assert!(exported_files(dir.path()).is_empty());
}

// ============================================================================
// Interactive mode
// ============================================================================

#[test]
fn test_interactive_session() {
    let dir = tempdir().unwrap();

    tsvgrid()
        .arg(fixture())
        .args(["--interactive", "--limit", "0", "-o"])
        .arg(dir.path())
        .write_stdin("search go\nsearch gomez\nfacets\nexport\nclear\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("📋 Showing 0 of 1 rows"))
        .stdout(predicate::str::contains("   • Activo"))
        .stdout(predicate::str::contains("✅ Exported 1 rows"))
        .stdout(predicate::str::contains("🧹 Filters cleared"));

    assert_eq!(exported_files(dir.path()).len(), 1);
}

#[test]
fn test_interactive_errors_are_recoverable() {
    tsvgrid()
        .arg(fixture())
        .args(["-i", "--limit", "0"])
        .write_stdin("dance\nfacet Q x\nexport someday\ndetail 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown command 'dance'"))
        .stdout(predicate::str::contains("❌ Column Q is not a facet column"))
        .stdout(predicate::str::contains("❌ Invalid date 'someday'"))
        .stdout(predicate::str::contains("👤 Lucía Martínez"));
}

#[test]
fn test_interactive_reload_keeps_filters() {
    tsvgrid()
        .arg(fixture())
        .args(["-i", "--facet", "B=Activo", "--limit", "0"])
        .write_stdin("reload\nshow\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 6 rows").count(2))
        .stdout(predicate::str::contains("📋 Showing 0 of 3 rows").count(2));
}

// ============================================================================
// Configuration and errors
// ============================================================================

#[test]
fn test_config_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("grid.json");
    fs::write(
        &config,
        format!(
            r#"{{
                "source_url": "{}",
                "facets": [{{"letter": "I", "label": "Grado"}}],
                "export": {{"identity": "C", "range_start": "E", "range_end": "E"}},
                "file_prefix": "Grado"
            }}"#,
            fixture().display().to_string().replace('\\', "\\\\")
        ),
    )
    .unwrap();

    tsvgrid()
        .arg("--config")
        .arg(&config)
        .args(["--facets", "--export", "--facet", "I=5", "-o"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("🏷️  Grado [I] = 5"))
        .stdout(predicate::str::contains("✅ Exported 2 rows"));

    let exported: Vec<PathBuf> = exported_files(dir.path())
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "csv"))
        .collect();
    assert_eq!(exported.len(), 1);
    let csv = fs::read_to_string(&exported[0]).unwrap();
    assert_eq!(
        csv,
        "Nombre del estudiante,Edad\nMaría José Pérez,10\nLucía Martínez,10\n"
    );
}

#[test]
fn test_no_source() {
    tsvgrid()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No source given"));
}

#[test]
fn test_missing_file() {
    tsvgrid()
        .arg("no/such/students.tsv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read no/such/students.tsv"));
}

#[test]
fn test_blank_document() {
    let dir = tempdir().unwrap();
    let blank = dir.path().join("blank.tsv");
    fs::write(&blank, "\n   \n\t\n").unwrap();

    tsvgrid()
        .arg(&blank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document has no header row"));
}

#[test]
fn test_bad_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("grid.json");
    fs::write(&config, r#"{"date_column": "42"}"#).unwrap();

    tsvgrid()
        .arg(fixture())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid column letter '42'"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    tsvgrid()
        .arg(fixture())
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed TSV document"))
        .stdout(predicate::str::contains("parsed TSV document").not());
}
