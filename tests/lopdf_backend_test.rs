//! Integration tests for the lopdf backend on generated PDFs.

mod common;

use common::{sample_report, PdfFixture};
use pdftoc::{
    extract_bytes, Error, OutlineEntry, ParseOptions, PdfBackend, PdfParser, Pdftoc,
};

#[test]
fn test_parse_generated_report() {
    let data = sample_report("Annual Report 2024").to_bytes();
    let parser = PdfParser::from_bytes(&data).unwrap();
    assert_eq!(parser.page_count(), 3);

    let model = parser.parse("report").unwrap();
    assert_eq!(model.name(), "report");
    assert_eq!(model.page_count(), 3);
    assert!(model.native_outline().is_empty());

    let first = model.page(0).unwrap();
    assert_eq!(first.runs[0].text, "Annual Report 2024");
    assert_eq!(first.runs[0].font_size, 24.0);
    assert!(first.runs.iter().all(|r| r.page == 0));
    assert!(first.markdown.starts_with("# Annual Report 2024"));

    let second = model.page(1).unwrap();
    assert!(second.markdown.contains("## Introduction"));
    assert!(second.markdown.contains("### Background"));
}

#[test]
fn test_reading_order_is_top_down() {
    let data = sample_report("Title Text").to_bytes();
    let parser = PdfParser::from_bytes(&data).unwrap();
    let runs = parser.backend().page_runs(1).unwrap();

    let ys: Vec<f32> = runs.iter().map(|r| r.y).collect();
    assert!(ys.windows(2).all(|w| w[0] < w[1]), "{:?}", ys);
}

#[test]
fn test_record_from_layout() {
    let data = sample_report("Annual Report 2024").to_bytes();
    let record = extract_bytes("annual", &data).unwrap();

    assert_eq!(record.title, "Annual Report 2024");
    assert_eq!(
        record.outline,
        vec![
            OutlineEntry::new(1, "Annual Report 2024", 0),
            OutlineEntry::new(2, "Introduction", 1),
            OutlineEntry::new(3, "Background", 1),
            OutlineEntry::new(2, "Results", 2),
        ]
    );
}

#[test]
fn test_metadata_and_native_outline() {
    let data = sample_report("Cover Text Here")
        .info_title("Field Guide to Mosses")
        .bookmark("1 Overview", 0)
        .child_bookmark("1.1 Scope", 0)
        .bookmark("2 Species", 1)
        .bookmark("3 Habitats", 2)
        .to_bytes();

    let extraction = Pdftoc::new().extract_bytes("mosses", &data).unwrap();
    assert_eq!(extraction.title_stage, Some("metadata"));
    assert_eq!(extraction.outline_stage, Some("native"));
    assert_eq!(extraction.record.title, "Field Guide to Mosses");
    assert_eq!(
        extraction.record.outline,
        vec![
            OutlineEntry::new(1, "1 Overview", 0),
            OutlineEntry::new(2, "1.1 Scope", 0),
            OutlineEntry::new(1, "2 Species", 1),
            OutlineEntry::new(1, "3 Habitats", 2),
        ]
    );
}

#[test]
fn test_placeholder_metadata_is_ignored() {
    let data = sample_report("Quarterly Review")
        .info_title("Microsoft Word - review.docx")
        .to_bytes();

    let extraction = Pdftoc::new().extract_bytes("review", &data).unwrap();
    assert_eq!(extraction.title_stage, Some("largest-text"));
    assert_eq!(extraction.record.title, "Quarterly Review");
}

#[test]
fn test_bold_lines_become_headings() {
    let body = "Plain body text that goes on for quite a while, with commas, and more words.";
    let data = PdfFixture::new()
        .page()
        .bold("Overview", 11)
        .text(body, 11)
        .text(body, 11)
        .page()
        .bold("Conclusion", 11)
        .text(body, 11)
        .to_bytes();

    let extraction = Pdftoc::new().extract_bytes("memo", &data).unwrap();
    assert_eq!(extraction.outline_stage, Some("bold-headings"));
    let texts: Vec<(&str, u32)> = extraction
        .record
        .outline
        .iter()
        .map(|e| (e.text.as_str(), e.page))
        .collect();
    assert_eq!(texts, [("Overview", 0), ("Conclusion", 1)]);
}

#[test]
fn test_empty_pages() {
    let data = PdfFixture::new().page().page().to_bytes();
    let record = extract_bytes("blank", &data).unwrap();
    assert_eq!(record.title, "");
    assert!(record.outline.is_empty());
}

#[test]
fn test_rejects_non_pdf() {
    assert!(matches!(
        PdfParser::from_bytes(b"GIF89a not a pdf"),
        Err(Error::UnknownFormat)
    ));
    assert!(PdfParser::from_bytes(b"%PDF-1.4\n%%EOF garbage").is_err());
}

#[test]
fn test_strict_mode_loads_clean_document() {
    let data = sample_report("Strict Title").to_bytes();
    let parser = PdfParser::from_bytes_with_options(&data, ParseOptions::new().strict()).unwrap();
    assert_eq!(parser.page_count(), 3);
}
