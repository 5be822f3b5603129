//! Metrics for the two standard PDF fonts the report uses
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em. The built-in faces
//! use `WinAnsiEncoding`, so anything outside that code page renders as `?`.

use printpdf::BuiltinFont;
use std::borrow::Cow;

/// Fonts available to the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
}

impl Font {
    /// The standard PDF face behind this font
    #[must_use]
    pub const fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
        }
    }
}

/// Ascender height of Helvetica, in 1/1000 em
pub const ASCENDER: f64 = 718.0;

/// Line advance of Helvetica including its line gap, per point of font size
pub const LINE_HEIGHT_FACTOR: f64 = 1.156;

/// Vertical distance one line of text occupies at `size`
#[must_use]
pub fn line_height(size: f64) -> f64 {
    size * LINE_HEIGHT_FACTOR
}

#[rustfmt::skip]
const REGULAR_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Map a character to its `WinAnsiEncoding` byte
#[must_use]
pub fn win_ansi(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{a0}'..='\u{ff}' => u8::try_from(u32::from(ch)).ok(),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        _ => None,
    }
}

/// Substitute `?` for characters the built-in faces cannot show
#[must_use]
pub fn printable(text: &str) -> Cow<'_, str> {
    if text.chars().all(|ch| win_ansi(ch).is_some()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|ch| if win_ansi(ch).is_some() { ch } else { '?' })
            .collect(),
    )
}

/// Strip accents from Latin-1 letters so they can borrow the base glyph width
const fn base_letter(ch: char) -> char {
    match ch {
        'À'..='Å' => 'A',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Advance width of one character, in 1/1000 em
#[must_use]
pub fn char_width(font: Font, ch: char) -> u16 {
    let table = match font {
        Font::Regular => &REGULAR_WIDTHS,
        Font::Bold => &BOLD_WIDTHS,
    };
    let ch = base_letter(ch);
    match ch {
        ' '..='~' => table[ch as usize - 0x20],
        '°' => 400,
        'µ' => {
            if font == Font::Bold {
                611
            } else {
                556
            }
        }
        '·' => 278,
        '—' | '…' => 1000,
        '•' => 350,
        '‘' | '’' => table[usize::from(b'\'') - 0x20],
        _ => 556,
    }
}

/// Width of `text` set in `font` at `size` points
#[must_use]
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(font, ch))).sum();
    f64::from(units) * size / 1000.0
}
