//! Styled-text PDF rendering
//!
//! Everything the binder synthesizes (converted content pages, cover, table of
//! contents, module dividers) renders through the line-based [`DocBuilder`]
//! here: text is wrapped against the page width, flowed across Letter pages
//! with 2cm margins, and written as PDF content streams using the standard
//! base-14 fonts with WinAnsi encoding. No font files are embedded.

pub mod html;
pub mod markdown;

use std::fs;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::Result;
use crate::layout::{Margins, PageDimensions};

/// Baseline-to-baseline spacing as a multiple of the font size.
const LINE_SPACING: f32 = 1.4;

/// Fonts available to rendered pages, all standard base-14 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Body,
    Bold,
    Oblique,
    Mono,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Body => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
            Font::Mono => "F4",
        }
    }

    fn base_name(self) -> &'static [u8] {
        match self {
            Font::Body => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
            Font::Oblique => b"Helvetica-Oblique",
            Font::Mono => b"Courier",
        }
    }

    /// Average glyph width as a fraction of the font size.
    fn width_factor(self) -> f32 {
        match self {
            Font::Body => 0.50,
            Font::Bold => 0.53,
            Font::Oblique => 0.50,
            Font::Mono => 0.60,
        }
    }

    fn all() -> [Font; 4] {
        [Font::Body, Font::Bold, Font::Oblique, Font::Mono]
    }
}

/// Estimate rendered text width from the average glyph width.
pub fn estimate_width(text: &str, font: Font, size: f32) -> f32 {
    text.chars().count() as f32 * size * font.width_factor()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One laid-out line of text.
#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub font: Font,
    pub size: f32,
    pub indent: f32,
    pub space_before: f32,
    pub align: Align,
}

impl Line {
    pub fn new(text: impl Into<String>, font: Font, size: f32) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            indent: 0.0,
            space_before: 0.0,
            align: Align::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn indent(mut self, pts: f32) -> Self {
        self.indent = pts;
        self
    }

    pub fn space_before(mut self, pts: f32) -> Self {
        self.space_before = pts;
        self
    }
}

/// Page-level configuration for a rendered document.
#[derive(Debug, Clone)]
pub struct PageSetup {
    pub size: PageDimensions,
    pub margins: Margins,
    /// Small gray line at the top of every page (filename or title).
    pub header: Option<String>,
    /// Centered "Page N" footer.
    pub page_numbers: bool,
    /// Single-page composition with the text block centered vertically.
    pub vertical_center: bool,
}

impl PageSetup {
    /// Content pages: Letter, 2cm margins, header and page-number footer.
    pub fn content(header: Option<String>) -> Self {
        Self {
            size: PageDimensions::letter(),
            margins: Margins::document(),
            header,
            page_numbers: true,
            vertical_center: false,
        }
    }

    /// Full-page compositions (cover, divider): centered block, no footer.
    pub fn full_page() -> Self {
        Self {
            size: PageDimensions::letter(),
            margins: Margins::narrow(),
            header: None,
            page_numbers: false,
            vertical_center: true,
        }
    }

    pub fn with_size(mut self, size: PageDimensions) -> Self {
        self.size = size;
        self
    }
}

/// A parsed JPEG ready for DCTDecode pass-through embedding.
#[derive(Debug, Clone)]
pub struct JpegImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// Read a baseline JPEG and sniff its dimensions from the SOF marker.
/// Returns `None` for anything that is not an embeddable JPEG.
pub fn read_jpeg(path: &Path) -> Option<JpegImage> {
    let data = fs::read(path).ok()?;
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        if (0xD0..=0xD9).contains(&marker) {
            i += 2;
            continue;
        }
        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if matches!(marker, 0xC0 | 0xC1 | 0xC2) {
            let height = u32::from(u16::from_be_bytes([data[i + 5], data[i + 6]]));
            let width = u32::from(u16::from_be_bytes([data[i + 7], data[i + 8]]));
            let components = data[i + 9];
            if width == 0 || height == 0 || !matches!(components, 1 | 3) {
                return None;
            }
            return Some(JpegImage {
                data,
                width,
                height,
                components,
            });
        }
        i += 2 + len;
    }

    None
}

/// A structural block produced by the markdown and HTML readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    Bullets(Vec<String>),
    Numbered(Vec<String>),
    Quote(Vec<String>),
    Code(Vec<String>),
    /// First row is the header row.
    Table(Vec<Vec<String>>),
}

#[derive(Debug, Clone, Copy)]
struct Placed {
    index: usize,
    y: f32,
}

/// Line-based document builder: push lines or blocks, then write a paginated
/// PDF. Page breaking and content-stream emission share the same layout pass,
/// so the reported page count always matches the written file.
pub struct DocBuilder {
    setup: PageSetup,
    lines: Vec<Line>,
    image: Option<JpegImage>,
}

impl DocBuilder {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            lines: Vec::new(),
            image: None,
        }
    }

    /// Horizontal space available to text.
    pub fn content_width(&self) -> f32 {
        (self.setup.size.width_pt() - self.setup.margins.left.pt() - self.setup.margins.right.pt())
            as f32
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Push text wrapped against the content width.
    pub fn push_wrapped(&mut self, text: &str, font: Font, size: f32, indent: f32, space_before: f32) {
        let max = self.content_width() - indent;
        for (i, part) in wrap_text(text, font, size, max).into_iter().enumerate() {
            let space = if i == 0 { space_before } else { 0.0 };
            self.push(Line::new(part, font, size).indent(indent).space_before(space));
        }
    }

    /// Push centered, wrapped text (used by composition pages).
    pub fn push_wrapped_centered(&mut self, text: &str, font: Font, size: f32, space_before: f32) {
        let max = self.content_width();
        for (i, part) in wrap_text(text, font, size, max).into_iter().enumerate() {
            let space = if i == 0 { space_before } else { 2.0 };
            self.push(Line::new(part, font, size).centered().space_before(space));
        }
    }

    /// Attach a JPEG drawn at the top of the first page.
    pub fn set_image(&mut self, image: JpegImage) {
        self.image = Some(image);
    }

    /// Render parsed blocks with the fixed content stylesheet.
    pub fn push_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            match block {
                Block::Heading { level, text } => {
                    let (size, space) = match level {
                        1 => (20.0, 16.0),
                        2 => (16.0, 14.0),
                        3 => (13.5, 12.0),
                        _ => (12.0, 10.0),
                    };
                    self.push_wrapped(text, Font::Bold, size, 0.0, space);
                }
                Block::Paragraph(text) => {
                    self.push_wrapped(text, Font::Body, 11.0, 0.0, 8.0);
                }
                Block::Bullets(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let space = if i == 0 { 6.0 } else { 3.0 };
                        self.push_wrapped(&format!("\u{2022} {item}"), Font::Body, 11.0, 14.0, space);
                    }
                }
                Block::Numbered(items) => {
                    for (i, item) in items.iter().enumerate() {
                        let space = if i == 0 { 6.0 } else { 3.0 };
                        self.push_wrapped(&format!("{}. {item}", i + 1), Font::Body, 11.0, 14.0, space);
                    }
                }
                Block::Quote(lines) => {
                    for (i, line) in lines.iter().enumerate() {
                        let space = if i == 0 { 8.0 } else { 2.0 };
                        self.push_wrapped(line, Font::Oblique, 11.0, 18.0, space);
                    }
                }
                Block::Code(lines) => {
                    let max = self.content_width() - 10.0;
                    for (i, line) in lines.iter().enumerate() {
                        let space = if i == 0 { 8.0 } else { 0.0 };
                        for (j, chunk) in chunk_preserving(line, Font::Mono, 9.0, max).into_iter().enumerate() {
                            let space = if j == 0 { space } else { 0.0 };
                            self.push(Line::new(chunk, Font::Mono, 9.0).indent(10.0).space_before(space));
                        }
                    }
                }
                Block::Table(rows) => {
                    let max = self.content_width();
                    for (i, line) in format_table(rows).into_iter().enumerate() {
                        let space = if i == 0 { 8.0 } else { 1.0 };
                        for (j, chunk) in chunk_preserving(&line, Font::Mono, 8.5, max).into_iter().enumerate() {
                            let space = if j == 0 { space } else { 0.0 };
                            self.push(Line::new(chunk, Font::Mono, 8.5).space_before(space));
                        }
                    }
                }
            }
        }
    }

    /// Number of pages the current content occupies.
    pub fn page_count(&self) -> usize {
        self.layout().len()
    }

    fn image_placement(&self, image: &JpegImage) -> (f32, f32, f32, f32) {
        let page_width = self.setup.size.width_pt() as f32;
        let page_height = self.setup.size.height_pt() as f32;
        let scale = f32::min(280.0 / image.width as f32, 200.0 / image.height as f32).min(2.0);
        let w = image.width as f32 * scale;
        let h = image.height as f32 * scale;
        let x = (page_width - w) / 2.0;
        let y = page_height - 90.0 - h;
        (x, y, w, h)
    }

    fn layout(&self) -> Vec<Vec<Placed>> {
        let top = (self.setup.size.height_pt() - self.setup.margins.top.pt()) as f32;
        let bottom = self.setup.margins.bottom.pt() as f32;

        if self.setup.vertical_center {
            let block_height: f32 = self
                .lines
                .iter()
                .map(|l| l.space_before + l.size * LINE_SPACING)
                .sum();
            let page_height = self.setup.size.height_pt() as f32;
            let mut start = (page_height + block_height) / 2.0;
            if let Some(image) = &self.image {
                let (_, image_bottom, _, _) = self.image_placement(image);
                start = start.min(image_bottom - 24.0);
            }
            let mut y = start.min(top);

            let mut placed = Vec::with_capacity(self.lines.len());
            for (index, line) in self.lines.iter().enumerate() {
                y -= line.space_before + line.size * LINE_SPACING;
                placed.push(Placed { index, y });
            }
            return vec![placed];
        }

        let mut pages = Vec::new();
        let mut current: Vec<Placed> = Vec::new();
        let mut y = top;
        for (index, line) in self.lines.iter().enumerate() {
            let line_height = line.size * LINE_SPACING;
            let mut needed = line.space_before + line_height;
            if y - needed < bottom && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                y = top;
                // inter-block spacing is dropped at the top of a fresh page
                needed = line_height;
            }
            y -= needed;
            current.push(Placed { index, y });
        }
        pages.push(current);
        pages
    }

    fn page_content(&self, page_index: usize, placed: &[Placed]) -> String {
        let width = self.setup.size.width_pt() as f32;
        let height = self.setup.size.height_pt() as f32;
        let left = self.setup.margins.left.pt() as f32;
        let right_limit = width - self.setup.margins.right.pt() as f32;

        let mut content = String::from("0 g\n");

        if page_index == 0 {
            if let Some(image) = &self.image {
                let (x, y, w, h) = self.image_placement(image);
                content.push_str(&format!(
                    "q\n{w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm\n/Img1 Do\nQ\n"
                ));
            }
        }

        if let Some(header) = &self.setup.header {
            let y = height - self.setup.margins.top.pt() as f32 + 18.0;
            content.push_str("0.5 g\n");
            text_op(&mut content, header, Font::Body, 9.0, left, y);
            content.push_str("0 g\n");
        }

        for p in placed {
            let line = &self.lines[p.index];
            if line.text.is_empty() {
                continue;
            }
            let est = estimate_width(&line.text, line.font, line.size);
            let x = match line.align {
                Align::Left => left + line.indent,
                Align::Center => (width - est) / 2.0,
                Align::Right => right_limit - est,
            };
            text_op(&mut content, &line.text, line.font, line.size, x, p.y);
        }

        if self.setup.page_numbers {
            let text = format!("Page {}", page_index + 1);
            let est = estimate_width(&text, Font::Body, 10.0);
            content.push_str("0.4 g\n");
            text_op(&mut content, &text, Font::Body, 10.0, (width - est) / 2.0, 28.0);
            content.push_str("0 g\n");
        }

        content
    }

    /// Write the document and return its page count.
    pub fn write(&self, output: &Path) -> Result<usize> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for font in Font::all() {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"Font".to_vec()));
            dict.set("Subtype", Object::Name(b"Type1".to_vec()));
            dict.set("BaseFont", Object::Name(font.base_name().to_vec()));
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let id = doc.add_object(Object::Dictionary(dict));
            font_dict.set(font.resource_name(), Object::Reference(id));
        }

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_dict));

        if let Some(image) = &self.image {
            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"XObject".to_vec()));
            dict.set("Subtype", Object::Name(b"Image".to_vec()));
            dict.set("Width", Object::Integer(i64::from(image.width)));
            dict.set("Height", Object::Integer(i64::from(image.height)));
            let color_space: &[u8] = if image.components == 1 {
                b"DeviceGray"
            } else {
                b"DeviceRGB"
            };
            dict.set("ColorSpace", Object::Name(color_space.to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            let stream = Stream {
                dict,
                content: image.data.clone(),
                allows_compression: false,
                start_position: None,
            };
            let image_id = doc.add_object(Object::Stream(stream));
            let mut xobjects = Dictionary::new();
            xobjects.set("Img1", Object::Reference(image_id));
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let resources_id = doc.add_object(Object::Dictionary(resources));

        let layout = self.layout();
        let mut page_ids = Vec::with_capacity(layout.len());
        let width = self.setup.size.width_pt() as f32;
        let height = self.setup.size.height_pt() as f32;

        for (page_index, placed) in layout.iter().enumerate() {
            let content = self.page_content(page_index, placed);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            );
            page.set("Contents", Object::Reference(content_id));
            page.set("Resources", Object::Reference(resources_id));
            page_ids.push(doc.add_object(Object::Dictionary(page)));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(page_ids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.compress();
        doc.save(output)?;
        Ok(layout.len())
    }
}

/// Wrap text on whitespace against a width limit; overlong single words are
/// hard-broken.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if estimate_width(word, font, size) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.extend(chunk_preserving(word, font, size, max_width));
            continue;
        }
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if estimate_width(&candidate, font, size) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Hard-break a string into width-bounded chunks without touching its spacing.
fn chunk_preserving(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let per_char = size * font.width_factor();
    let max_chars = ((max_width / per_char) as usize).max(8);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// Format table rows as aligned monospace text, with a rule under the header.
fn format_table(rows: &[Vec<String>]) -> Vec<String> {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = Vec::new();
    for (ri, row) in rows.iter().enumerate() {
        let cells: Vec<String> = (0..cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}", width = widths[i])
            })
            .collect();
        out.push(cells.join("  ").trim_end().to_string());
        if ri == 0 && rows.len() > 1 {
            out.push(
                widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("  "),
            );
        }
    }
    out
}

fn text_op(out: &mut String, text: &str, font: Font, size: f32, x: f32, y: f32) {
    out.push_str("BT\n");
    out.push_str(&format!("/{} {:.1} Tf\n", font.resource_name(), size));
    out.push_str(&format!("1 0 0 1 {x:.2} {y:.2} Tm\n"));
    out.push_str(&format!("({}) Tj\n", escape_pdf_text(text)));
    out.push_str("ET\n");
}

/// Escape text for a PDF literal string, transcoding to WinAnsi bytes.
/// Characters outside WinAnsi degrade to `?`.
pub fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let byte = winansi_byte(ch).unwrap_or(b'?');
        match byte {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        '\u{2018}' | '\u{2019}' => Some(b'\''),
        '\u{201c}' | '\u{201d}' => Some(b'"'),
        '\u{2013}' | '\u{2014}' => Some(b'-'),
        '\u{2022}' => Some(0x95),
        '\u{2026}' => Some(0x85),
        '\u{20ac}' => Some(0x80),
        '\t' => Some(b' '),
        c if (c as u32) < 0x80 => Some(c as u8),
        c if (0xA0..=0xFF).contains(&(c as u32)) => Some(c as u32 as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("one two three four five six", Font::Body, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(estimate_width(line, Font::Body, 10.0) <= 60.0);
        }
    }

    #[test]
    fn test_wrap_text_hard_breaks_long_words() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, Font::Mono, 10.0, 120.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(""), word);
    }

    #[test]
    fn test_escape_pdf_text() {
        assert_eq!(escape_pdf_text("plain"), "plain");
        assert_eq!(escape_pdf_text("a(b)c\\d"), "a\\(b\\)c\\\\d");
        assert_eq!(escape_pdf_text("caf\u{e9}"), "caf\\351");
        assert_eq!(escape_pdf_text("\u{2019}tis"), "'tis");
        assert_eq!(escape_pdf_text("\u{4e2d}"), "?");
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let rows = vec![
            vec!["Name".to_string(), "Qty".to_string()],
            vec!["apples".to_string(), "2".to_string()],
        ];
        let lines = format_table(&rows);
        assert_eq!(lines[0], "Name    Qty");
        assert_eq!(lines[1], "------  ---");
        assert_eq!(lines[2], "apples  2");
    }

    #[test]
    fn test_single_page_document_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.pdf");

        let mut builder = DocBuilder::new(PageSetup::content(Some("one.md".to_string())));
        builder.push_wrapped("Hello there", Font::Body, 11.0, 0.0, 0.0);
        let pages = builder.write(&path).unwrap();
        assert_eq!(pages, 1);

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_document_paginates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.pdf");

        let mut builder = DocBuilder::new(PageSetup::content(None));
        for i in 0..200 {
            builder.push_wrapped(&format!("Line number {i}"), Font::Body, 11.0, 0.0, 4.0);
        }
        let pages = builder.write(&path).unwrap();
        assert!(pages > 1);

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), pages);
    }

    #[test]
    fn test_vertical_center_is_single_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cover.pdf");

        let mut builder = DocBuilder::new(PageSetup::full_page());
        builder.push(Line::new("Big Title", Font::Bold, 30.0).centered());
        builder.push(Line::new("Subtitle", Font::Oblique, 14.0).centered().space_before(12.0));
        assert_eq!(builder.page_count(), 1);
        assert_eq!(builder.write(&path).unwrap(), 1);
    }

    #[test]
    fn test_empty_document_still_has_one_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pdf");

        let builder = DocBuilder::new(PageSetup::content(None));
        assert_eq!(builder.write(&path).unwrap(), 1);

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_read_jpeg_rejects_non_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"not a jpeg at all").unwrap();
        assert!(read_jpeg(&path).is_none());
    }

    #[test]
    fn test_read_jpeg_sniffs_dimensions() {
        // Minimal JPEG skeleton: SOI, SOF0 with 3 components, EOI
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&200u16.to_be_bytes()); // height
        data.extend_from_slice(&320u16.to_be_bytes()); // width
        data.push(3);
        data.extend_from_slice(&[0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        data.extend_from_slice(&[0xFF, 0xD9]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.jpg");
        std::fs::write(&path, &data).unwrap();

        let image = read_jpeg(&path).unwrap();
        assert_eq!(image.width, 320);
        assert_eq!(image.height, 200);
        assert_eq!(image.components, 3);
    }
}
