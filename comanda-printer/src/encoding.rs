//! Text folding for thermal printers
//!
//! The printer's built-in code page does not reliably render accented Latin
//! characters, so text is folded to plain ASCII before it reaches the buffer:
//! - Accented letters are decomposed (NFD) and the combining marks dropped
//!   (`á` → `a`, `ñ` → `n`, `Ü` → `U`)
//! - A few Spanish punctuation marks get an ASCII stand-in (`¿` → `?`)
//! - Anything else outside ASCII becomes [`FALLBACK_CHAR`]
//!
//! The transformation is lossy on purpose. Wrapping works on the folded
//! text, i.e. one byte per column.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Replacement for characters with no ASCII rendering
pub const FALLBACK_CHAR: char = '?';

/// Fold a string to printable ASCII
///
/// Control characters (including ESC/GS) are turned into spaces so user text
/// can never smuggle printer commands into the buffer.
pub fn fold_to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfd() {
        if c.is_ascii() {
            if c.is_ascii_control() {
                out.push(' ');
            } else {
                out.push(c);
            }
            continue;
        }
        if is_combining_mark(c) {
            continue;
        }
        match c {
            '¿' => out.push('?'),
            '¡' => out.push('!'),
            'º' => out.push('o'),
            'ª' => out.push('a'),
            '€' => out.push_str("EUR"),
            '«' | '»' | '“' | '”' => out.push('"'),
            '‘' | '’' => out.push('\''),
            '–' | '—' => out.push('-'),
            '\u{a0}' => out.push(' '),
            _ => out.push(FALLBACK_CHAR),
        }
    }
    out
}

/// Word-wrap text to a column width
///
/// Existing line breaks are kept. Words longer than the width are split.
pub fn wrap_text(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in s.replace("\r\n", "\n").split(['\n', '\r']) {
        let mut current = String::new();
        for word in fold_to_ascii(paragraph).split_whitespace() {
            let mut word = word.to_string();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word);
                word = rest;
            }
            if current.is_empty() {
                current = word;
            } else if current.len() + 1 + word.len() <= width {
                current.push(' ');
                current.push_str(&word);
            } else {
                lines.push(std::mem::replace(&mut current, word));
            }
        }
        lines.push(current);
    }

    // Drop trailing empty lines produced by a trailing newline
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_spanish_accents() {
        assert_eq!(fold_to_ascii("á é í ó ú ñ"), "a e i o u n");
        assert_eq!(fold_to_ascii("ÁÉÍÓÚÑÜ"), "AEIOUNU");
        assert_eq!(fold_to_ascii("Ají de gallina"), "Aji de gallina");
    }

    #[test]
    fn test_punctuation_and_fallback() {
        assert_eq!(fold_to_ascii("¿Sin ají?"), "?Sin aji?");
        assert_eq!(fold_to_ascii("¡Rápido!"), "!Rapido!");
        assert_eq!(fold_to_ascii("1º piso"), "1o piso");
        assert_eq!(fold_to_ascii("pollo 🍗"), "pollo ?");
    }

    #[test]
    fn test_control_chars_become_spaces() {
        assert_eq!(fold_to_ascii("a\x1B@b"), "a @b");
        assert_eq!(fold_to_ascii("x\ty"), "x y");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("sin papas y con mucha cebolla", 12),
            vec!["sin papas y", "con mucha", "cebolla"]
        );
        assert_eq!(wrap_text("uno\ndos", 10), vec!["uno", "dos"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("Chicharrón ñandú", 10), vec!["Chicharron", "nandu"]);
    }
}
