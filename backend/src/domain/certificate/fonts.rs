//! Metrics and encoding for the three standard Helvetica faces used on
//! certificates. Widths are in 1/1000 em, taken from the Adobe core font AFMs.

/// Helvetica advance widths for ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' .. '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0' .. '?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@' .. 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P' .. '_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`' .. 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p' .. '~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' .. '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0' .. '?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@' .. 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P' .. '_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`' .. 'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p' .. '~'
];

const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

    /// Name of the font in each page's resource dictionary
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
            Font::Regular | Font::Oblique => &HELVETICA_WIDTHS,
        }
    }

    pub fn char_width(self, c: char) -> u16 {
        let c = base_letter(c);
        let code = c as u32;
        if (32..=126).contains(&code) {
            self.widths()[(code - 32) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

/// Accented Latin letters measure like their unaccented base letter
fn base_letter(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'Ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' => 'Y',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ª' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'º' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        other => other,
    }
}

/// WinAnsiEncoding byte for `c`, or `None` when the font cannot show it
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '…' => Some(0x85),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '•' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_match_afm_samples() {
        assert_eq!(Font::Regular.char_width(' '), 278);
        assert_eq!(Font::Regular.char_width('W'), 944);
        assert_eq!(Font::Regular.char_width('i'), 222);
        assert_eq!(Font::Bold.char_width('i'), 278);
        assert_eq!(Font::Bold.char_width('m'), 889);
        assert_eq!(Font::Oblique.char_width('m'), 833);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(Font::Bold.char_width('Ç'), Font::Bold.char_width('C'));
        assert_eq!(Font::Regular.char_width('ã'), Font::Regular.char_width('a'));
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = Font::Regular.text_width("Pastor", 10.0);
        let large = Font::Regular.text_width("Pastor", 20.0);
        assert!((large - 2.0 * small).abs() < 0.001);
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(win_ansi_byte('A'), Some(0x41));
        assert_eq!(win_ansi_byte('Ç'), Some(0xC7));
        assert_eq!(win_ansi_byte('—'), Some(0x97));
        assert_eq!(win_ansi_byte('═'), None);
    }
}
