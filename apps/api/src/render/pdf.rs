// PDF backend: draws the section layout onto A4 pages with the builtin Helvetica faces.
// printpdf documents are not Send, so a document lives entirely inside one `render` call.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rgb,
};

use super::font_metrics::{get_metrics, Face, PageConfig, PT_TO_MM};
use super::layout::{layout_document, Block, LinkSpan, Section, TextStyle};
use super::{DocumentRenderer, RenderError};
use crate::cv::document::CvDocument;

type Tone = (f32, f32, f32);

const INK: Tone = (0.10, 0.10, 0.10);
const MUTED: Tone = (0.40, 0.40, 0.40);
const ACCENT: Tone = (0.05, 0.30, 0.55);

const LINE_HEIGHT: f32 = 1.35;
const SECTION_GAP_PT: f32 = 12.0;
const ENTRY_GAP_PT: f32 = 4.0;
const BULLET_INDENT_MM: f32 = 4.5;
const COLUMN_GAP_MM: f32 = 4.0;
const HEADING_SIZE_PT: f32 = 12.0;
const LINK_SEPARATOR: &str = "  •  ";

fn pdf_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(e.to_string())
}

fn style(style: TextStyle) -> (Face, f32, Tone) {
    match style {
        TextStyle::Name => (Face::Bold, 22.0, INK),
        TextStyle::Headline => (Face::Regular, 12.0, MUTED),
        TextStyle::Contact => (Face::Regular, 9.5, MUTED),
        TextStyle::Body => (Face::Regular, 10.0, INK),
        TextStyle::Meta => (Face::Oblique, 9.0, MUTED),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    page: PageConfig,
}

impl PdfRenderer {
    /// Renders and reports how many pages the document needed.
    fn render_pages(&self, document: &CvDocument) -> Result<(Vec<u8>, usize), RenderError> {
        let sections = layout_document(document.content());
        let mut canvas = Canvas::new(document.display_name(), &self.page)?;

        for (index, section) in sections.iter().enumerate() {
            if index > 0 {
                canvas.gap(SECTION_GAP_PT);
            }
            canvas.section(section);
        }

        let pages = canvas.pages;
        let bytes = canvas.doc.save_to_bytes().map_err(pdf_error)?;
        Ok((bytes, pages))
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &CvDocument) -> Result<Vec<u8>, RenderError> {
        self.render_pages(document).map(|(bytes, _)| bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas: cursor + page breaking over a printpdf document
// ────────────────────────────────────────────────────────────────────────────

struct Canvas<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    page: &'a PageConfig,
    /// Baseline of the last drawn line, measured from the bottom edge.
    cursor_mm: f32,
    pages: usize,
}

impl<'a> Canvas<'a> {
    fn new(title: &str, page: &'a PageConfig) -> Result<Self, RenderError> {
        let (doc, page_index, layer_index) =
            PdfDocument::new(title, Mm(page.width_mm), Mm(page.height_mm), "Layer 1");

        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let oblique = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page_index).get_layer(layer_index);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            oblique,
            page,
            cursor_mm: page.height_mm - page.margin_top_mm,
            pages: 1,
        })
    }

    fn font(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Oblique => &self.oblique,
        }
    }

    fn left(&self) -> f32 {
        self.page.margin_x_mm
    }

    fn right(&self) -> f32 {
        self.page.width_mm - self.page.margin_x_mm
    }

    fn gap(&mut self, size_pt: f32) {
        self.cursor_mm -= size_pt * PT_TO_MM;
    }

    /// Moves to the next baseline, starting a fresh page when the line would
    /// cross the bottom margin.
    fn next_line(&mut self, size_pt: f32) {
        let advance = size_pt * LINE_HEIGHT * PT_TO_MM;
        if self.cursor_mm - advance < self.page.margin_bottom_mm {
            self.pages += 1;
            let (page_index, layer_index) = self.doc.add_page(
                Mm(self.page.width_mm),
                Mm(self.page.height_mm),
                format!("Page {}", self.pages),
            );
            self.layer = self.doc.get_page(page_index).get_layer(layer_index);
            self.cursor_mm = self.page.height_mm - self.page.margin_top_mm;
        }
        self.cursor_mm -= advance;
    }

    fn draw(&self, text: &str, face: Face, size_pt: f32, x_mm: f32, tone: Tone) {
        let (r, g, b) = tone;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer
            .use_text(text, size_pt, Mm(x_mm), Mm(self.cursor_mm), self.font(face));
    }

    fn draw_right(&self, text: &str, face: Face, size_pt: f32, tone: Tone) {
        let width = get_metrics(face).width_mm(text, size_pt);
        self.draw(text, face, size_pt, self.right() - width, tone);
    }

    fn paragraph(&mut self, text: &str, face: Face, size_pt: f32, tone: Tone, centered: bool) {
        let metrics = get_metrics(face);
        for line in metrics.wrap(text, size_pt, self.page.text_width_mm()) {
            self.next_line(size_pt);
            let x = if centered {
                (self.page.width_mm - metrics.width_mm(&line, size_pt)) / 2.0
            } else {
                self.left()
            };
            self.draw(&line, face, size_pt, x, tone);
        }
    }

    fn section(&mut self, section: &Section) {
        if let Some(heading) = section.kind.heading() {
            self.next_line(HEADING_SIZE_PT);
            self.draw(heading, Face::Bold, HEADING_SIZE_PT, self.left(), ACCENT);
            self.gap(2.0);
        }

        let centered = section.kind.is_centered();
        let mut first_row = true;
        for block in &section.blocks {
            match block {
                Block::Text { text, style: text_style } => {
                    let (face, size, tone) = style(*text_style);
                    self.paragraph(text, face, size, tone, centered);
                }
                Block::Bullets { items } => self.bullets(items),
                Block::Row {
                    title,
                    subtitle,
                    date,
                    note,
                } => {
                    if !first_row {
                        self.gap(ENTRY_GAP_PT);
                    }
                    first_row = false;
                    self.row(title, subtitle.as_deref(), date, note.as_deref());
                }
                Block::Links { links } => self.links(links, centered),
            }
        }
    }

    /// Title on the left with the date right-aligned on the same baseline;
    /// subtitle and note follow on a second line.
    fn row(&mut self, title: &str, subtitle: Option<&str>, date: &str, note: Option<&str>) {
        const TITLE_PT: f32 = 11.0;
        const DETAIL_PT: f32 = 9.5;

        let date_width = get_metrics(Face::Regular).width_mm(date, DETAIL_PT);
        let title_width = self.page.text_width_mm() - date_width - COLUMN_GAP_MM;
        let title_lines = get_metrics(Face::Bold).wrap(title, TITLE_PT, title_width);

        self.next_line(TITLE_PT);
        let mut lines = title_lines.iter();
        if let Some(first) = lines.next() {
            self.draw(first, Face::Bold, TITLE_PT, self.left(), INK);
        }
        if !date.is_empty() {
            self.draw_right(date, Face::Regular, DETAIL_PT, MUTED);
        }
        for line in lines {
            self.next_line(TITLE_PT);
            self.draw(line, Face::Bold, TITLE_PT, self.left(), INK);
        }

        if subtitle.is_none() && note.is_none() {
            return;
        }
        self.next_line(DETAIL_PT + 0.5);
        if let Some(subtitle) = subtitle {
            self.draw(subtitle, Face::Regular, DETAIL_PT + 0.5, self.left(), MUTED);
        }
        if let Some(note) = note {
            self.draw_right(note, Face::Oblique, DETAIL_PT, MUTED);
        }
    }

    fn bullets(&mut self, items: &[String]) {
        let (face, size, tone) = style(TextStyle::Body);
        let metrics = get_metrics(face);
        let width = self.page.text_width_mm() - BULLET_INDENT_MM;

        for item in items {
            for (index, line) in metrics.wrap(item, size, width).iter().enumerate() {
                self.next_line(size);
                if index == 0 {
                    self.draw("•", face, size, self.left() + 1.0, tone);
                }
                self.draw(line, face, size, self.left() + BULLET_INDENT_MM, tone);
            }
        }
    }

    fn links(&mut self, links: &[LinkSpan], centered: bool) {
        let text = links
            .iter()
            .map(|link| {
                if link.label.trim().is_empty() {
                    link.url.clone()
                } else {
                    format!("{}: {}", link.label, link.url)
                }
            })
            .collect::<Vec<_>>()
            .join(LINK_SEPARATOR);
        self.paragraph(&text, Face::Regular, 9.0, ACCENT, centered);
    }
}
