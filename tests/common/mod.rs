//! Shared fixtures: small PDFs generated with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdftoc::{Error, Metadata, NativeOutlineEntry, PdfBackend, Result, TextRun};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;

/// One line of text on a generated page.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub size: i64,
    pub bold: bool,
}

/// One bookmark of a generated outline, with optional children.
#[derive(Debug, Clone)]
pub struct Bookmark {
    pub title: String,
    pub page: usize,
    pub children: Vec<Bookmark>,
}

/// Builder for test PDFs.
#[derive(Debug, Clone, Default)]
pub struct PdfFixture {
    title: Option<String>,
    pages: Vec<Vec<Line>>,
    bookmarks: Vec<Bookmark>,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Info dictionary title.
    pub fn info_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Start a new page.
    pub fn page(mut self) -> Self {
        self.pages.push(Vec::new());
        self
    }

    /// Add a regular line to the current page.
    pub fn text(self, text: &str, size: i64) -> Self {
        self.line(text, size, false)
    }

    /// Add a bold line to the current page.
    pub fn bold(self, text: &str, size: i64) -> Self {
        self.line(text, size, true)
    }

    fn line(mut self, text: &str, size: i64, bold: bool) -> Self {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        if let Some(page) = self.pages.last_mut() {
            page.push(Line {
                text: text.to_string(),
                size,
                bold,
            });
        }
        self
    }

    /// Add a top-level bookmark.
    pub fn bookmark(mut self, title: &str, page: usize) -> Self {
        self.bookmarks.push(Bookmark {
            title: title.to_string(),
            page,
            children: Vec::new(),
        });
        self
    }

    /// Add a child to the last top-level bookmark.
    pub fn child_bookmark(mut self, title: &str, page: usize) -> Self {
        if let Some(parent) = self.bookmarks.last_mut() {
            parent.children.push(Bookmark {
                title: title.to_string(),
                page,
                children: Vec::new(),
            });
        }
        self
    }

    /// Build the document.
    pub fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));

        let page_ids: Vec<ObjectId> = self
            .pages
            .iter()
            .map(|lines| {
                let content = page_content(lines);
                let content_id = doc.add_object(Stream::new(
                    dictionary! {},
                    content.encode().unwrap_or_default(),
                ));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                    "Resources" => dictionary! {
                        "Font" => dictionary! { "F1" => regular_id, "F2" => bold_id },
                    },
                })
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => page_ids.len() as i64,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };
        if !self.bookmarks.is_empty() {
            let outlines_id = doc.new_object_id();
            let (first, last) = add_bookmarks(&mut doc, &self.bookmarks, outlines_id, &page_ids);
            doc.objects.insert(
                outlines_id,
                Object::Dictionary(dictionary! {
                    "Type" => "Outlines",
                    "First" => first,
                    "Last" => last,
                    "Count" => self.bookmarks.len() as i64,
                }),
            );
            catalog.set("Outlines", outlines_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("fixture"),
            });
            doc.trailer.set("Info", info_id);
        }

        doc
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut doc = self.build();
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("fixture PDF should serialize");
        buf
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_content(lines: &[Line]) -> Content {
    let mut operations = vec![Operation::new("BT", vec![])];
    let mut y = PAGE_HEIGHT - 72;
    for line in lines {
        y -= line.size * 2;
        let font = if line.bold { "F2" } else { "F1" };
        operations.push(Operation::new("Tf", vec![font.into(), line.size.into()]));
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Add a sibling chain of bookmarks under `parent`, returning its first and last ids.
fn add_bookmarks(
    doc: &mut Document,
    bookmarks: &[Bookmark],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> (ObjectId, ObjectId) {
    let ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();

    for (i, bookmark) in bookmarks.iter().enumerate() {
        let page_ref = page_ids
            .get(bookmark.page)
            .copied()
            .map(Object::Reference)
            .unwrap_or(Object::Integer(bookmark.page as i64));

        let mut item = dictionary! {
            "Title" => Object::string_literal(bookmark.title.as_str()),
            "Parent" => parent,
            "Dest" => vec![page_ref, "Fit".into()],
        };
        if i > 0 {
            item.set("Prev", ids[i - 1]);
        }
        if let Some(next) = ids.get(i + 1) {
            item.set("Next", *next);
        }
        if !bookmark.children.is_empty() {
            let (first, last) = add_bookmarks(doc, &bookmark.children, ids[i], page_ids);
            item.set("First", first);
            item.set("Last", last);
            item.set("Count", bookmark.children.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    (ids[0], ids[ids.len() - 1])
}

/// A report-like document: large title, three headings, body text.
pub fn sample_report(title: &str) -> PdfFixture {
    let body = "The quick brown fox jumps over the lazy dog near the river bank today";
    PdfFixture::new()
        .page()
        .text(title, 24)
        .text(body, 11)
        .text(body, 11)
        .page()
        .text("Introduction", 18)
        .text(body, 11)
        .text(body, 11)
        .text("Background", 14)
        .text(body, 11)
        .page()
        .text("Results", 18)
        .text(body, 11)
        .text(body, 11)
}

/// In-memory [`PdfBackend`] for resolver tests.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub metadata: Metadata,
    pub outline: Vec<NativeOutlineEntry>,
    pub runs: Vec<Vec<TextRun>>,
    pub markdown: Vec<String>,
    pub broken_outline: bool,
}

impl FakeBackend {
    /// A backend with `pages` empty pages.
    pub fn with_pages(pages: usize) -> Self {
        Self {
            runs: vec![Vec::new(); pages],
            markdown: vec![String::new(); pages],
            ..Default::default()
        }
    }

    /// A backend whose pages only carry markdown.
    pub fn from_markdown(pages: &[&str]) -> Self {
        let mut backend = Self::with_pages(pages.len());
        backend.markdown = pages.iter().map(|p| p.to_string()).collect();
        backend
    }
}

impl PdfBackend for FakeBackend {
    fn page_count(&self) -> usize {
        self.runs.len()
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }

    fn native_outline(&self) -> Result<Vec<NativeOutlineEntry>> {
        if self.broken_outline {
            return Err(Error::PdfParse("bad outline".to_string()));
        }
        Ok(self.outline.clone())
    }

    fn page_runs(&self, page: usize) -> Result<Vec<TextRun>> {
        self.runs
            .get(page)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.runs.len()))
    }

    fn page_markdown(&self, page: usize) -> Result<String> {
        self.markdown
            .get(page)
            .cloned()
            .ok_or(Error::PageOutOfRange(page, self.markdown.len()))
    }
}
