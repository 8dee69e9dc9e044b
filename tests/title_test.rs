//! Integration tests for title resolution.

mod common;

use common::FakeBackend;
use pdftoc::parser::build_model;
use pdftoc::{Metadata, ResolveOptions, TextRun, TitleResolver};

fn resolve(backend: &FakeBackend, name: &str) -> (Option<&'static str>, String) {
    let model = build_model(name, backend).unwrap();
    match TitleResolver::default().resolve_with_stage(&model) {
        Some((stage, title)) => (Some(stage), title),
        None => (None, String::new()),
    }
}

fn first_page(runs: Vec<TextRun>) -> FakeBackend {
    let mut backend = FakeBackend::with_pages(2);
    backend.runs[0] = runs;
    backend
}

#[test]
fn test_metadata_title_wins_over_page_content() {
    let mut backend = first_page(vec![
        TextRun::new("Completely Different Heading", 36.0).at(72.0, 80.0),
        TextRun::new("Some body text", 11.0).at(72.0, 140.0),
    ]);
    backend.metadata = Metadata::new().with("title", "Stream Ecology Handbook");

    assert_eq!(
        resolve(&backend, "handbook"),
        (Some("metadata"), "Stream Ecology Handbook".to_string())
    );
}

#[test]
fn test_unique_largest_run_becomes_title() {
    let backend = first_page(vec![
        TextRun::new("Prepared for the board", 11.0).at(72.0, 60.0),
        TextRun::new("Annual Report 2024", 28.0).at(72.0, 120.0),
        TextRun::new("Contents", 14.0).at(72.0, 200.0),
        TextRun::new("1 Overview", 11.0).at(72.0, 230.0),
    ]);

    assert_eq!(
        resolve(&backend, "ar"),
        (Some("largest-text"), "Annual Report 2024".to_string())
    );
}

#[test]
fn test_largest_text_spanning_runs_on_one_line() {
    let backend = first_page(vec![
        TextRun::new("Annual", 28.0).at(72.0, 120.0).with_width(80.0),
        TextRun::new("Report", 28.0).at(160.0, 120.0).with_width(80.0),
        TextRun::new("small print", 9.0).at(72.0, 700.0),
    ]);

    assert_eq!(resolve(&backend, "x").1, "Annual Report");
}

#[test]
fn test_filename_metadata_is_a_placeholder() {
    let mut backend = first_page(vec![TextRun::new("Soil Survey Results", 20.0)]);
    backend.metadata = Metadata::new().with("Title", "SOIL_SURVEY");

    assert_eq!(
        resolve(&backend, "soil_survey"),
        (Some("largest-text"), "Soil Survey Results".to_string())
    );
}

#[test]
fn test_first_line_skips_boilerplate() {
    let backend = first_page(vec![
        TextRun::new("12", 11.0).at(300.0, 30.0),
        TextRun::new("Confidential", 11.0).at(72.0, 50.0),
        TextRun::new("Minutes of the Planning Meeting", 11.0).at(72.0, 90.0),
        TextRun::new(&"long body ".repeat(40), 11.0).at(72.0, 120.0),
        TextRun::new("•", 30.0).at(40.0, 400.0),
    ]);

    assert_eq!(
        resolve(&backend, "minutes"),
        (Some("first-line"), "Minutes of the Planning Meeting".to_string())
    );
}

#[test]
fn test_title_is_normalized() {
    let mut backend = FakeBackend::with_pages(1);
    backend.metadata = Metadata::new().with("Title", "  The\u{00A0}Eﬃcient  “Reader”\u{200B} ");

    assert_eq!(resolve(&backend, "doc").1, "The Efficient \"Reader\"");
}

#[test]
fn test_no_text_gives_empty_title() {
    let backend = FakeBackend::with_pages(3);
    assert_eq!(resolve(&backend, "empty"), (None, String::new()));
}

#[test]
fn test_custom_placeholder_list() {
    let mut backend = first_page(vec![TextRun::new("Real Title Here", 22.0)]);
    backend.metadata = Metadata::new().with("Title", "Draft Copy");
    let model = build_model("doc", &backend).unwrap();

    assert_eq!(TitleResolver::default().resolve(&model), "Draft Copy");

    let options = ResolveOptions::default().with_placeholder_titles(["draft copy"]);
    assert_eq!(TitleResolver::new(options).resolve(&model), "Real Title Here");
}
