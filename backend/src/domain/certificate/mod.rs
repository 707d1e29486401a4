//! # Child Presentation Certificates
//!
//! Turns a presentation record into a one-page (occasionally longer) PDF and
//! keeps the generated files under the web root.
//!
//! - `view` merges the stored record with per-render overrides
//! - `layout` flows text blocks onto pages
//! - `pdf` and `fonts` serialize those pages
//! - `store` writes and reads the generated files

pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod store;
pub mod view;

use chrono::NaiveDate;

pub use store::CertificateStore;
pub use view::{CertificateView, Presentee};

use fonts::Font;
use layout::{Align, Block, TextStyle};
use pdf::Rgb;

pub const CERTIFICATE_TITLE: &str = "CERTIFICADO DE APRESENTAÇÃO";
const SIGNATURE_LINE: &str = "_________________________________";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Renders the certificate, stamping it as issued on `issued_on`
pub fn render_certificate(view: &CertificateView, issued_on: NaiveDate) -> Vec<u8> {
    let pages = layout::flow(&compose(view, issued_on));
    pdf::write_document(&pages)
}

/// The certificate's blocks, top to bottom
pub fn compose(view: &CertificateView, issued_on: NaiveDate) -> Vec<Block> {
    let primary = view.presentee.primary_color();
    let centered = |text: String, style: TextStyle, space_after: f32| Block::Paragraph {
        text,
        style,
        align: Align::Center,
        space_after,
    };
    let regular = |size: f32| TextStyle::new(Font::Regular, size, Rgb::BLACK);

    let mut blocks = vec![
        Block::Spacer(40.0),
        centered(
            CERTIFICATE_TITLE.to_string(),
            TextStyle::new(Font::Bold, 24.0, primary),
            10.0,
        ),
        Block::Rule {
            width: 300.0,
            color: primary,
            double: true,
            space_after: 30.0,
        },
        centered(
            format!("Certificamos que {}", view.presentee.article()),
            regular(14.0),
            14.0,
        ),
        Block::Boxed {
            text: view.child_name.to_uppercase(),
            style: TextStyle::new(Font::Bold, 20.0, primary),
            padding: 10.0,
            border_width: 2.0,
            space_after: 14.0,
        },
        centered(
            format!("nascido(a) em {}", format_date(view.birth_date)),
            regular(12.0),
            8.0,
        ),
        centered(
            format!("filho(a) de {} e {}", view.father_name, view.mother_name),
            regular(12.0),
            14.0,
        ),
        centered(
            "foi apresentado(a) ao Senhor Jesus Cristo nesta igreja em".to_string(),
            regular(14.0),
            6.0,
        ),
        centered(
            format_date(view.presentation_date),
            TextStyle::new(Font::Bold, 16.0, primary),
            24.0,
        ),
    ];

    if let Some(verse) = &view.biblical_verse {
        blocks.push(centered(
            format!("\"{}\"", verse),
            TextStyle::new(Font::Oblique, 12.0, Rgb::DARK_GRAY),
            16.0,
        ));
    }

    if let Some(message) = &view.special_message {
        blocks.push(centered(
            message.clone(),
            TextStyle::new(Font::Regular, 11.0, Rgb::DARK_GRAY),
            16.0,
        ));
    }

    blocks.push(Block::Spacer(20.0));
    blocks.push(centered(
        view.church_name.clone(),
        TextStyle::new(Font::Bold, 14.0, Rgb::BLACK),
        4.0,
    ));
    if let Some(address) = &view.church_address {
        blocks.push(centered(address.clone(), regular(10.0), 4.0));
    }

    blocks.push(Block::Spacer(40.0));
    blocks.push(centered(SIGNATURE_LINE.to_string(), regular(12.0), 2.0));
    blocks.push(centered(format!("Pastor {}", view.pastor), regular(12.0), 30.0));
    blocks.push(Block::Paragraph {
        text: format!("Emitido em {}", format_date(issued_on)),
        style: TextStyle::new(Font::Regular, 10.0, Rgb::GRAY),
        align: Align::Right,
        space_after: 0.0,
    });

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(presentee: Presentee) -> CertificateView {
        CertificateView {
            presentee,
            child_name: "Maria Clara".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            father_name: "Paulo".to_string(),
            mother_name: "Rita".to_string(),
            presentation_date: NaiveDate::from_ymd_opt(2024, 2, 18).unwrap(),
            church_name: "Igreja Central".to_string(),
            church_address: Some("Rua A, 10".to_string()),
            pastor: "Marcos".to_string(),
            biblical_verse: Some("Deixai vir a mim os pequeninos".to_string()),
            special_message: None,
        }
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_boy_certificate_uses_blue_and_menino() {
        let pdf = text(&render_certificate(
            &view(Presentee::Boy),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ));

        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("(Certificamos que o menino)"));
        assert!(pdf.contains("0.000 0.000 1.000 rg"));
        assert!(!pdf.contains("1.000 0.078 0.576 rg"));
    }

    #[test]
    fn test_girl_certificate_uses_pink_and_menina() {
        let pdf = text(&render_certificate(
            &view(Presentee::Girl),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ));

        assert!(pdf.contains("(Certificamos que a menina)"));
        assert!(pdf.contains("1.000 0.078 0.576 rg"));
        assert!(!pdf.contains("0.000 0.000 1.000 rg"));
    }

    #[test]
    fn test_layout_blocks_and_text() {
        let pdf = text(&render_certificate(
            &view(Presentee::Girl),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ));

        assert!(pdf.contains("(CERTIFICADO DE APRESENTA\\307\\303O)"));
        assert!(pdf.contains("(MARIA CLARA)"));
        assert!(pdf.contains("(nascido\\(a\\) em 05/01/2023)"));
        assert!(pdf.contains("(filho\\(a\\) de Paulo e Rita)"));
        assert!(pdf.contains("(18/02/2024)"));
        assert!(pdf.contains("(\"Deixai vir a mim os pequeninos\")"));
        assert!(pdf.contains("(Pastor Marcos)"));
        assert!(pdf.contains("(Emitido em 01/03/2024)"));
        assert!(pdf.contains(" re S"));
    }

    #[test]
    fn test_optional_blocks_are_skipped_when_absent() {
        let mut v = view(Presentee::Boy);
        v.biblical_verse = None;
        v.church_address = None;

        let blocks = compose(&v, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let with_all = compose(&view(Presentee::Boy), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        assert_eq!(with_all.len() - blocks.len(), 2);
    }

    #[test]
    fn test_renders_differ_only_in_issue_stamp() {
        let v = view(Presentee::Boy);
        let first = render_certificate(&v, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let again = render_certificate(&v, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let later = render_certificate(&v, NaiveDate::from_ymd_opt(2025, 11, 30).unwrap());

        assert_eq!(first, again);
        assert_eq!(first.len(), later.len());
        let normalized = text(&later).replace("Emitido em 30/11/2025", "Emitido em 01/03/2024");
        assert_eq!(text(&first), normalized);
    }

    #[test]
    fn test_long_message_still_renders_every_word() {
        let mut v = view(Presentee::Girl);
        v.special_message = Some(["Que Deus abençoe"; 200].join(" "));

        let pages = layout::flow(&compose(&v, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));

        assert!(pages.len() >= 2);
        let rendered = text(&pdf::write_document(&pages));
        assert!(rendered.contains("(Emitido em 01/03/2024)"));
    }
}
