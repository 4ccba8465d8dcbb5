//! Paginated programme document.
//!
//! `PdfProgramme` records drawing operations while the export runs and only
//! touches `printpdf` in `finish`, so an export in progress stays `Send`.

use super::capture::{
    DayCapture, BODY_LINE, CARD_WIDTH, CHROME_LINE, CONTENT_WIDTH, ROW_PADDING, TIME_LINE,
    TITLE_HEIGHT, TITLE_LINE,
};
use crate::schedule::Side;
use anyhow::{anyhow, Context, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;

const HEADER_BASELINE: f32 = 14.0;
const CONTENT_TOP: f32 = 26.0;
const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - MARGIN;
const FOOTER_BASELINE: f32 = PAGE_HEIGHT - 9.0;
const MARKER_SIZE: f32 = 4.0;
const CARD_GAP: f32 = 8.0;

const BACKGROUND: (u8, u8, u8) = (250, 248, 244);
const INK: (u8, u8, u8) = (33, 37, 41);
const MUTED: (u8, u8, u8) = (108, 117, 125);
const RULE: (u8, u8, u8) = (200, 200, 200);

/// Where an export writes its pages. `y` grows downwards from the page top.
pub trait ProgrammeDocument {
    /// First usable `y` on a fresh page.
    fn content_top(&self) -> f32;

    /// Lowest usable `y` on any page.
    fn content_bottom(&self) -> f32;

    /// Title, subtitle and generation line on the first page; returns the cursor.
    fn title_block(&mut self, title: &str, subtitle: &str, generated: &str) -> Result<f32>;

    /// Start a page with background and running title; returns the cursor.
    fn new_page(&mut self, running_title: &str) -> Result<f32>;

    fn place(&mut self, capture: &DayCapture, y: f32) -> Result<()>;

    /// Closing line on the last page.
    fn footer(&mut self, text: &str) -> Result<()>;

    fn page_count(&self) -> usize;

    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Text {
        text: String,
        size: f32,
        x: f32,
        y: f32,
        bold: bool,
        color: (u8, u8, u8),
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: (u8, u8, u8),
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: (u8, u8, u8),
    },
}

#[derive(Debug, Default)]
struct Page {
    ops: Vec<Op>,
}

impl Page {
    fn with_background() -> Self {
        Self {
            ops: vec![Op::Rect {
                x: 0.0,
                y: 0.0,
                width: PAGE_WIDTH,
                height: PAGE_HEIGHT,
                color: BACKGROUND,
            }],
        }
    }

    fn text(&mut self, text: &str, size: f32, x: f32, y: f32, bold: bool, color: (u8, u8, u8)) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            size,
            x,
            y,
            bold,
            color,
        });
    }
}

/// A4 portrait programme rendered with the PDF builtin Helvetica faces.
pub struct PdfProgramme {
    title: String,
    pages: Vec<Page>,
}

impl PdfProgramme {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            pages: vec![Page::with_background()],
        }
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::with_background());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl ProgrammeDocument for PdfProgramme {
    fn content_top(&self) -> f32 {
        CONTENT_TOP
    }

    fn content_bottom(&self) -> f32 {
        CONTENT_BOTTOM
    }

    fn title_block(&mut self, title: &str, subtitle: &str, generated: &str) -> Result<f32> {
        let page = self.current();
        page.text(title, 22.0, MARGIN, 40.0, true, INK);
        page.text(subtitle, 14.0, MARGIN, 50.0, false, INK);
        page.text(generated, 10.0, MARGIN, 58.0, false, MUTED);
        page.ops.push(Op::Rule {
            x1: MARGIN,
            y1: 64.0,
            x2: MARGIN + CONTENT_WIDTH,
            y2: 64.0,
            thickness: 1.0,
            color: RULE,
        });
        Ok(72.0)
    }

    fn new_page(&mut self, running_title: &str) -> Result<f32> {
        let mut page = Page::with_background();
        page.text(running_title, 10.0, MARGIN, HEADER_BASELINE, true, MUTED);
        page.ops.push(Op::Rule {
            x1: MARGIN,
            y1: HEADER_BASELINE + 4.0,
            x2: MARGIN + CONTENT_WIDTH,
            y2: HEADER_BASELINE + 4.0,
            thickness: 0.5,
            color: RULE,
        });
        self.pages.push(page);
        Ok(CONTENT_TOP)
    }

    fn place(&mut self, capture: &DayCapture, y: f32) -> Result<()> {
        let center = MARGIN + CONTENT_WIDTH / 2.0;
        let page = self.current();
        let mut cursor = y;

        if let Some(title) = &capture.title {
            page.text(title, 13.0, MARGIN, cursor + 7.0, true, INK);
            cursor += TITLE_HEIGHT;
        }

        for line in &capture.chrome {
            page.text(line, 9.0, MARGIN, cursor + 4.5, false, MUTED);
            cursor += CHROME_LINE;
        }

        let rows_height: f32 = capture.rows.iter().map(|r| r.height()).sum();
        if rows_height > 0.0 {
            page.ops.push(Op::Rule {
                x1: center,
                y1: cursor,
                x2: center,
                y2: cursor + rows_height,
                thickness: 0.8,
                color: RULE,
            });
        }

        for row in &capture.rows {
            let top = cursor + ROW_PADDING;
            page.ops.push(Op::Rect {
                x: center - MARKER_SIZE / 2.0,
                y: top,
                width: MARKER_SIZE,
                height: MARKER_SIZE,
                color: row.color,
            });

            let card_x = match row.side {
                Side::Right => center + CARD_GAP,
                Side::Left => center - CARD_GAP - CARD_WIDTH,
            };

            if capture.emphasis {
                page.ops.push(Op::Rect {
                    x: card_x - 3.0,
                    y: top,
                    width: 1.2,
                    height: row.height() - ROW_PADDING * 2.0,
                    color: row.color,
                });
            }

            let mut baseline = top + TIME_LINE - 1.0;
            page.text(
                &format!("{}  ·  {}", row.time, row.label),
                9.0,
                card_x,
                baseline,
                true,
                row.color,
            );

            for line in &row.title_lines {
                baseline += TITLE_LINE;
                page.text(line, 11.0, card_x, baseline, capture.emphasis, INK);
            }
            for line in &row.detail_lines {
                baseline += BODY_LINE;
                page.text(line, 9.0, card_x, baseline, false, MUTED);
            }

            cursor += row.height();
        }

        Ok(())
    }

    fn footer(&mut self, text: &str) -> Result<()> {
        self.current().text(text, 9.0, MARGIN, FOOTER_BASELINE, false, MUTED);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self) -> Result<Vec<u8>> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            &self.title,
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "programme",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("{:?}", e))
            .context("Failed to load Helvetica")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("{:?}", e))
            .context("Failed to load Helvetica-Bold")?;

        let total = self.pages.len();
        for (number, page) in self.pages.iter().enumerate() {
            let layer = if number == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "programme");
                doc.get_page(page_index).get_layer(layer_index)
            };

            for op in &page.ops {
                draw(&layer, op, &regular, &bold);
            }

            let page_number = Op::Text {
                text: format!("{} / {}", number + 1, total),
                size: 8.0,
                x: MARGIN + CONTENT_WIDTH - 12.0,
                y: FOOTER_BASELINE,
                bold: false,
                color: MUTED,
            };
            draw(&layer, &page_number, &regular, &bold);
        }

        doc.save_to_bytes()
            .map_err(|e| anyhow!("{:?}", e))
            .context("Failed to serialize PDF")
    }
}

fn rgb(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

/// PDF user space starts at the bottom-left corner.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

fn draw(layer: &PdfLayerReference, op: &Op, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    match op {
        Op::Text {
            text,
            size,
            x,
            y,
            bold: is_bold,
            color,
        } => {
            layer.set_fill_color(rgb(*color));
            let font = if *is_bold { bold } else { regular };
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*y), font);
        }
        Op::Rect {
            x,
            y,
            width,
            height,
            color,
        } => {
            layer.set_fill_color(rgb(*color));
            layer.add_rect(Rect::new(Mm(*x), flip(*y + *height), Mm(*x + *width), flip(*y)));
        }
        Op::Rule {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        } => {
            layer.set_outline_color(rgb(*color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), flip(*y1)), false),
                    (Point::new(Mm(*x2), flip(*y2)), false),
                ],
                is_closed: false,
            });
        }
    }
}
