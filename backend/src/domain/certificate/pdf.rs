//! Minimal PDF 1.4 writer.
//!
//! Produces uncompressed content streams using the standard Type1 Helvetica
//! faces, so no font data is embedded. Output is byte-for-byte deterministic
//! for the same pages: there is no creation date or random document id.

use std::fmt::Write as _;

use super::fonts::{win_ansi_byte, Font};

pub const A4_WIDTH: f32 = 595.0;
pub const A4_HEIGHT: f32 = 842.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const DARK_GRAY: Rgb = Rgb(64, 64, 64);

    fn components(self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0
        )
    }
}

/// One positioned drawing instruction. Coordinates are PDF points with the
/// origin at the bottom left of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        font: Font,
        size: f32,
        color: Rgb,
        x: f32,
        y: f32,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        line_width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    fn content_stream(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::Text {
                    font,
                    size,
                    color,
                    x,
                    y,
                    text,
                } => {
                    out.extend_from_slice(
                        format!(
                            "BT /{} {:.1} Tf {} rg {:.2} {:.2} Td ",
                            font.resource_name(),
                            size,
                            color.components(),
                            x,
                            y
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(&encode_string(text));
                    out.extend_from_slice(b" Tj ET\n");
                }
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    line_width,
                    color,
                } => {
                    out.extend_from_slice(
                        format!(
                            "{} RG {:.2} w {:.2} {:.2} {:.2} {:.2} re S\n",
                            color.components(),
                            line_width,
                            x,
                            y,
                            width,
                            height
                        )
                        .as_bytes(),
                    );
                }
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    line_width,
                    color,
                } => {
                    out.extend_from_slice(
                        format!(
                            "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S\n",
                            color.components(),
                            line_width,
                            x1,
                            y1,
                            x2,
                            y2
                        )
                        .as_bytes(),
                    );
                }
            }
        }
        out
    }
}

/// PDF literal string in WinAnsi bytes. Characters outside the encoding are
/// shown as `?`.
pub fn encode_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        match win_ansi_byte(c).unwrap_or(b'?') {
            b @ (b'(' | b')' | b'\\') => {
                out.push(b'\\');
                out.push(b);
            }
            b @ 0x20..=0x7E => out.push(b),
            b => out.extend_from_slice(format!("\\{:03o}", b).as_bytes()),
        }
    }
    out.push(b')');
    out
}

/// Serializes pages into a complete PDF file
pub fn write_document(pages: &[Page]) -> Vec<u8> {
    let mut writer = ObjectWriter::new();

    // 1: catalog, 2: page tree, 3..=5: fonts, then a page and its content per page
    let first_page_id = 3 + Font::ALL.len();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| first_page_id + 2 * i).collect();

    writer.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");

    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        2,
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).as_bytes(),
    );

    let mut font_resources = String::new();
    for (i, font) in Font::ALL.iter().enumerate() {
        let id = 3 + i;
        writer.object(
            id,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .as_bytes(),
        );
        let _ = write!(font_resources, "/{} {} 0 R ", font.resource_name(), id);
    }

    for (page, page_id) in pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        writer.object(
            *page_id,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {}>> >> /Contents {} 0 R >>",
                A4_WIDTH, A4_HEIGHT, font_resources, content_id
            )
            .as_bytes(),
        );

        let stream = page.content_stream();
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        writer.object(content_id, &body);
    }

    writer.finish()
}

struct ObjectWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl ObjectWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.offsets.push((id, self.buf.len()));
        self.buf
            .extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", size);
        for (_, offset) in &self.offsets {
            let _ = write!(xref, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, xref_offset
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_escapes_delimiters_and_encodes_accents() {
        assert_eq!(encode_string("a(b)c\\"), b"(a\\(b\\)c\\\\)".to_vec());
        assert_eq!(as_text(&encode_string("AÇÃO")), "(A\\307\\303O)");
        assert_eq!(as_text(&encode_string("═")), "(?)");
    }

    #[test]
    fn test_document_structure() {
        let page = Page {
            ops: vec![DrawOp::Text {
                font: Font::Bold,
                size: 12.0,
                color: Rgb(0, 0, 255),
                x: 10.0,
                y: 20.0,
                text: "Oi".to_string(),
            }],
        };
        let bytes = write_document(&[page.clone(), page]);
        let text = as_text(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("BT /F2 12.0 Tf 0.000 0.000 1.000 rg 10.00 20.00 Td (Oi) Tj ET"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = write_document(&[Page::default()]);

        let marker = b"startxref\n";
        let start = bytes
            .windows(marker.len())
            .rposition(|w| w == marker)
            .unwrap()
            + marker.len();
        let xref_at: usize = std::str::from_utf8(&bytes[start..])
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref"));

        let entries: Vec<usize> = std::str::from_utf8(&bytes[xref_at..])
            .unwrap()
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 7);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                bytes[*offset..].starts_with(expected.as_bytes()),
                "object {} misplaced",
                i + 1
            );
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let page = Page {
            ops: vec![DrawOp::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 100.0,
                y2: 0.0,
                line_width: 1.0,
                color: Rgb::GRAY,
            }],
        };
        assert_eq!(write_document(&[page.clone()]), write_document(&[page]));
    }
}
