//! Glyph widths for the two standard fonts used on receipts, and greedy
//! word wrapping against them.

use unicode_normalization::UnicodeNormalization;

/// Helvetica widths for code points 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold widths for code points 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const DEFAULT_WIDTH: u16 = 556;

/// One of the base-14 fonts every PDF reader ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// PostScript name written into the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Name under which the font is registered in page resources.
    pub fn resource_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
        }
    }

    fn table(self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica => &HELVETICA,
            StandardFont::HelveticaBold => &HELVETICA_BOLD,
        }
    }

    /// Advance width of a character in 1/1000 em.
    ///
    /// Accented Latin letters take the width of their base letter.
    pub fn char_width(self, c: char) -> u16 {
        if let Some(w) = self.ascii_width(c) {
            return w;
        }
        match c {
            '\u{a0}' => 278,
            '\u{ba}' | '\u{aa}' => 365,
            '\u{b0}' => 400,
            '\u{2013}' => 556,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => if self == StandardFont::Helvetica { 222 } else { 278 },
            '\u{201c}' | '\u{201d}' => if self == StandardFont::Helvetica { 333 } else { 500 },
            '\u{2022}' => 350,
            '\u{df}' => 611,
            _ => c
                .nfd()
                .next()
                .and_then(|base| self.ascii_width(base))
                .unwrap_or(DEFAULT_WIDTH),
        }
    }

    fn ascii_width(self, c: char) -> Option<u16> {
        let code = c as u32;
        if (32..=126).contains(&code) {
            Some(self.table()[(code - 32) as usize])
        } else {
            None
        }
    }

    /// Width of a string in points at the given size.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }

    /// Greedy word wrap so that no line is wider than `max_width`.
    ///
    /// A word wider than the whole line is broken between characters.
    pub fn wrap(self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if self.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if self.text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = self.break_word(word, size, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn break_word(self, word: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut piece = String::new();

        for c in word.chars() {
            piece.push(c);
            if piece.chars().count() > 1 && self.text_width(&piece, size) > max_width {
                piece.pop();
                pieces.push(std::mem::replace(&mut piece, c.to_string()));
            }
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(StandardFont::Helvetica.char_width(' '), 278);
        assert_eq!(StandardFont::Helvetica.char_width('W'), 944);
        assert_eq!(StandardFont::Helvetica.char_width('i'), 222);
        assert_eq!(StandardFont::HelveticaBold.char_width('i'), 278);
        assert_eq!(StandardFont::Helvetica.char_width('~'), 584);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(StandardFont::Helvetica.char_width('ã'), StandardFont::Helvetica.char_width('a'));
        assert_eq!(StandardFont::Helvetica.char_width('Ç'), StandardFont::Helvetica.char_width('C'));
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w12 = StandardFont::Helvetica.text_width("Igreja", 12.0);
        let w24 = StandardFont::Helvetica.text_width("Igreja", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 0.001);
    }

    #[test]
    fn test_wrap_lines_fit() {
        let text = "Received from Igreja Batista Central da Cidade the amount of R$ 1250.00 \
                    regarding \"Pagamento de serviços de manutenção elétrica do templo\" on 10/03/2024.";
        for max in [80.0_f32, 150.0, 300.0, 483.28] {
            let lines = StandardFont::Helvetica.wrap(text, 12.0, max);
            assert!(!lines.is_empty());
            for line in &lines {
                assert!(
                    StandardFont::Helvetica.text_width(line, 12.0) <= max,
                    "line {:?} wider than {}",
                    line,
                    max
                );
            }
            let rejoined: String = lines.concat().split_whitespace().collect();
            let original: String = text.split_whitespace().collect();
            assert_eq!(rejoined, original);
        }
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let word = "x".repeat(200);
        let lines = StandardFont::HelveticaBold.wrap(&word, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        assert!(lines.iter().all(|l| StandardFont::HelveticaBold.text_width(l, 12.0) <= 100.0));
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(StandardFont::Helvetica.wrap("   ", 12.0, 100.0).is_empty());
    }
}
