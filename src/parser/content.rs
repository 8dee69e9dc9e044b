//! Content stream interpretation.
//!
//! Walks the text operators of a page content stream and produces
//! [`TextRun`]s with font and position information. Positions are converted
//! so that `y` grows downwards from the top of the page's MediaBox.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::TextRun;

use super::backend::{decode_text_simple, get_number, resolve};
use super::layout::is_spaceless_script_char;

/// US Letter height, used when no MediaBox is found.
const DEFAULT_PAGE_TOP: f32 = 792.0;

/// TJ adjustments beyond this (thousandths of an em) read as word breaks.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Extract the text runs of one page.
pub(crate) fn extract_page_runs(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page_index: usize,
) -> Result<Vec<TextRun>> {
    let data = page_content(doc, page_id)?;
    if data.is_empty() {
        return Ok(vec![]);
    }

    let content = Content::decode(&data)
        .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_index, e)))?;

    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_index, e)))?;

    let reader = PageContentReader {
        doc,
        fonts,
        page_top: page_top(doc, page_id),
        page_index,
    };
    Ok(reader.interpret(&content.operations))
}

/// Concatenated content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(vec![]);
    };

    match resolve(doc, contents) {
        Object::Stream(s) => decode_content_stream(s),
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Stream(s) = resolve(doc, obj) {
                    match decode_content_stream(s) {
                        Ok(data) => {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                        Err(e) => log::warn!("Skipping content stream of {:?}: {}", page_id, e),
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

/// Stream bytes, decompressed only when the stream declares a `/Filter`.
fn decode_content_stream(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| Error::PdfParse(format!("Failed to decompress content stream: {}", e)))
    } else {
        Ok(stream.content.clone())
    }
}

/// Top edge of the page's MediaBox, following inheritance through `/Parent`.
fn page_top(doc: &LopdfDocument, page_id: ObjectId) -> f32 {
    let mut current = doc.get_dictionary(page_id).ok();
    let mut hops = 0;

    while let Some(dict) = current {
        if let Ok(media_box) = dict.get(b"MediaBox") {
            if let Ok(array) = resolve(doc, media_box).as_array() {
                if array.len() >= 4 {
                    let y0 = get_number(&array[1]).unwrap_or(0.0);
                    let y1 = get_number(&array[3]).unwrap_or(DEFAULT_PAGE_TOP);
                    return y0.max(y1);
                }
            }
        }

        hops += 1;
        if hops > 32 {
            break;
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    DEFAULT_PAGE_TOP
}

struct PageContentReader<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    page_top: f32,
    page_index: usize,
}

/// Text state plus the current transformation matrix.
#[derive(Debug, Clone)]
struct TextState {
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    ctm: TextMatrix,
    matrix: TextMatrix,
    line_matrix: TextMatrix,
    in_text_block: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            ctm: TextMatrix::default(),
            matrix: TextMatrix::default(),
            line_matrix: TextMatrix::default(),
            in_text_block: false,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix.clone();
    }

    fn next_line(&mut self) {
        let leading = if self.leading > 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    /// Restore the graphics state saved by `q`, keeping the text object.
    fn restore(&mut self, saved: TextState) {
        let matrix = std::mem::take(&mut self.matrix);
        let line_matrix = std::mem::take(&mut self.line_matrix);
        let in_text_block = self.in_text_block;
        *self = saved;
        self.matrix = matrix;
        self.line_matrix = line_matrix;
        self.in_text_block = in_text_block;
    }
}

impl PageContentReader<'_> {
    fn interpret(&self, operations: &[Operation]) -> Vec<TextRun> {
        let mut runs = Vec::new();
        let mut state = TextState::default();
        let mut saved: Vec<TextState> = Vec::new();

        for op in operations {
            match op.operator.as_str() {
                "q" => saved.push(state.clone()),
                "Q" => {
                    if let Some(previous) = saved.pop() {
                        state.restore(previous);
                    }
                }
                "cm" => {
                    if let Some(m) = TextMatrix::from_operands(&op.operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "BT" => {
                    state.in_text_block = true;
                    state.matrix = TextMatrix::default();
                    state.line_matrix = TextMatrix::default();
                }
                "ET" => {
                    state.in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(resource) = &op.operands[0] {
                            state.font_resource = resource.clone();
                            state.font_name = self.base_font(resource);
                        }
                        state.font_size = get_number(&op.operands[1]).unwrap_or(12.0).abs();
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = TextMatrix::from_operands(&op.operands) {
                        state.line_matrix = m.clone();
                        state.matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        let text = self.decode(&state.font_resource, bytes);
                        self.show_text(&mut state, text, 0.0, &mut runs);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let (text, adjustment) = self.decode_tj(&state.font_resource, items);
                        self.show_text(&mut state, text, adjustment, &mut runs);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        let text = self.decode(&state.font_resource, bytes);
                        self.show_text(&mut state, text, 0.0, &mut runs);
                    }
                }
                _ => {}
            }
        }

        runs
    }

    /// Emit a run for `text` at the current position and advance past it.
    ///
    /// `adjustment` is the total TJ displacement in thousandths of an em.
    fn show_text(&self, state: &mut TextState, text: String, adjustment: f32, runs: &mut Vec<TextRun>) {
        if !state.in_text_block {
            return;
        }

        let char_count = text.chars().count() as f32;
        let advance = char_count * state.font_size * 0.5 - adjustment / 1000.0 * state.font_size;
        let device = state.matrix.multiply(&state.ctm);
        let (x, y) = device.position();

        if !text.trim().is_empty() {
            let effective_size = (state.font_size * device.vertical_scale()).abs();
            runs.push(
                TextRun::new(text, effective_size)
                    .with_font(state.font_name.clone())
                    .on_page(self.page_index)
                    .at(x, self.page_top - y)
                    .with_width(char_count * effective_size * 0.5),
            );
        }

        state.matrix.translate(advance, 0.0);
    }

    /// Decode a TJ array, inserting spaces at large negative adjustments.
    fn decode_tj(&self, font_resource: &[u8], items: &[Object]) -> (String, f32) {
        let mut combined = String::new();
        let mut total_adjustment = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode(font_resource, bytes));
                }
                Object::Integer(_) | Object::Real(_) => {
                    let n = get_number(item).unwrap_or(0.0);
                    total_adjustment += n;
                    if -n > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                        && !combined.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        (combined, total_adjustment)
    }

    /// Decode a string operand with the font's encoding.
    fn decode(&self, font_resource: &[u8], bytes: &[u8]) -> String {
        self.fonts
            .get(font_resource)
            .and_then(|font| font.get_font_encoding(self.doc).ok())
            .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }

    /// Base font name for a font resource, falling back to the resource name.
    fn base_font(&self, resource: &[u8]) -> String {
        self.fonts
            .get(resource)
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string())
    }
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    /// Matrix from the six operands of `Tm` or `cm`.
    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0]).unwrap_or(1.0),
            b: get_number(&operands[1]).unwrap_or(0.0),
            c: get_number(&operands[2]).unwrap_or(0.0),
            d: get_number(&operands[3]).unwrap_or(1.0),
            e: get_number(&operands[4]).unwrap_or(0.0),
            f: get_number(&operands[5]).unwrap_or(0.0),
        })
    }

    /// `self × other`, i.e. `self` applied first.
    fn multiply(&self, other: &TextMatrix) -> TextMatrix {
        TextMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        let scale = (self.c * self.c + self.d * self.d).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }
}
