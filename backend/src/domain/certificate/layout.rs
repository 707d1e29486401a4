//! Flows a vertical list of blocks onto A4 pages.
//!
//! Text is word-wrapped to the content width. A block that does not fit in
//! the space left on the current page starts a new page; a paragraph taller
//! than a whole page is split between lines.

use super::fonts::Font;
use super::pdf::{DrawOp, Page, Rgb, A4_HEIGHT, A4_WIDTH};

pub const MARGIN: f32 = 56.0;
const LINE_SPACING: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(font: Font, size: f32, color: Rgb) -> Self {
        Self { font, size, color }
    }

    fn line_height(&self) -> f32 {
        self.size * LINE_SPACING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        text: String,
        style: TextStyle,
        align: Align,
        space_after: f32,
    },
    /// Centered text surrounded by a stroked border
    Boxed {
        text: String,
        style: TextStyle,
        padding: f32,
        border_width: f32,
        space_after: f32,
    },
    /// Centered horizontal rule; `double` draws two parallel strokes
    Rule {
        width: f32,
        color: Rgb,
        double: bool,
        space_after: f32,
    },
    Spacer(f32),
}

/// Lays blocks out top to bottom, returning at least one page
pub fn flow(blocks: &[Block]) -> Vec<Page> {
    let mut cursor = Cursor::new();
    for block in blocks {
        cursor.place(block);
    }
    cursor.finish()
}

/// Greedy word wrap. A single word wider than `max_width` gets a line of its own.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if current.is_empty() || font.text_width(&candidate, size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

struct Cursor {
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: A4_HEIGHT - MARGIN,
        }
    }

    fn content_width() -> f32 {
        A4_WIDTH - 2.0 * MARGIN
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = A4_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, height: f32) {
        let page_is_fresh = self.current.ops.is_empty();
        if height > self.remaining() && !page_is_fresh {
            self.new_page();
        }
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Paragraph {
                text,
                style,
                align,
                space_after,
            } => {
                let lines = wrap(text, style.font, style.size, Self::content_width());
                let line_height = style.line_height();
                let total = line_height * lines.len() as f32;
                if total <= A4_HEIGHT - 2.0 * MARGIN {
                    self.ensure_room(total);
                }
                for line in lines {
                    self.ensure_room(line_height);
                    self.y -= line_height;
                    let width = style.font.text_width(&line, style.size);
                    let x = match align {
                        Align::Left => MARGIN,
                        Align::Center => (A4_WIDTH - width) / 2.0,
                        Align::Right => A4_WIDTH - MARGIN - width,
                    };
                    self.text(*style, x, self.y + baseline_offset(style), line);
                }
                self.advance(*space_after);
            }
            Block::Boxed {
                text,
                style,
                padding,
                border_width,
                space_after,
            } => {
                let inner_width = Self::content_width() - 2.0 * padding;
                let lines = wrap(text, style.font, style.size, inner_width);
                let line_height = style.line_height();
                let height = line_height * lines.len() as f32 + 2.0 * padding;
                let widest = lines
                    .iter()
                    .map(|l| style.font.text_width(l, style.size))
                    .fold(0.0_f32, f32::max);
                let width = widest + 2.0 * padding;

                self.ensure_room(height);
                let top = self.y;
                self.y -= height;
                self.current.ops.push(DrawOp::Rect {
                    x: (A4_WIDTH - width) / 2.0,
                    y: self.y,
                    width,
                    height,
                    line_width: *border_width,
                    color: style.color,
                });

                let mut line_top = top - padding;
                for line in lines {
                    line_top -= line_height;
                    let line_width = style.font.text_width(&line, style.size);
                    let x = (A4_WIDTH - line_width) / 2.0;
                    self.text(*style, x, line_top + baseline_offset(style), line);
                }
                self.advance(*space_after);
            }
            Block::Rule {
                width,
                color,
                double,
                space_after,
            } => {
                let height = if *double { 4.0 } else { 1.0 };
                self.ensure_room(height);
                let x1 = (A4_WIDTH - width) / 2.0;
                let x2 = x1 + width;
                self.y -= 1.0;
                self.line(x1, x2, *color);
                if *double {
                    self.y -= 3.0;
                    self.line(x1, x2, *color);
                }
                self.advance(*space_after);
            }
            Block::Spacer(height) => self.advance(*height),
        }
    }

    fn text(&mut self, style: TextStyle, x: f32, y: f32, text: String) {
        self.current.ops.push(DrawOp::Text {
            font: style.font,
            size: style.size,
            color: style.color,
            x,
            y,
            text,
        });
    }

    fn line(&mut self, x1: f32, x2: f32, color: Rgb) {
        self.current.ops.push(DrawOp::Line {
            x1,
            y1: self.y,
            x2,
            y2: self.y,
            line_width: 1.0,
            color,
        });
    }

    /// Vertical gap. Never carries over to the next page.
    fn advance(&mut self, height: f32) {
        self.y = (self.y - height).max(MARGIN);
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

/// Distance from the bottom of a line box up to the text baseline
fn baseline_offset(style: &TextStyle) -> f32 {
    (style.line_height() - style.size) / 2.0 + style.size * 0.2
}
