//! Character-class tables for Amharic text cleaning.
//!
//! All of the script- and punctuation-specific tuning used by [`crate::clean`]
//! and [`crate::segment`] lives here as plain data, so the tables can be
//! inspected and tested on their own.
//!
//! | Table | Used by |
//! |-------|---------|
//! | [`ETHIOPIC_BLOCK`] | normalizer (lone-glyph removal), script extractor |
//! | [`NOISE_SYMBOLS`] | normalizer (symbol stripping) |
//! | [`ALLOWED_PUNCTUATION`] | script extractor |
//! | [`SENTENCE_TERMINATORS`] | sentence segmenter |

use std::ops::RangeInclusive;

/// The Ethiopic Unicode block (syllables, punctuation, numerals).
pub const ETHIOPIC_BLOCK: RangeInclusive<char> = '\u{1200}'..='\u{137F}';

/// Ethiopic full stop `።`.
pub const ETHIOPIC_FULL_STOP: char = '\u{1362}';

/// Symbols stripped by the normalizer. Any run of them becomes one space.
pub const NOISE_SYMBOLS: &[char] = &[
    '[', ']', '{', '}', '<', '>', '\u{201C}', '\u{201D}', '"', '\'', '(', ')', '_', '/', '\\',
    '=', '+', '@', '#', '%', '*', '~', '`', '|', '^', '\u{2022}', '\u{25CF}',
];

/// Punctuation kept by the script extractor in addition to Ethiopic
/// codepoints, ASCII digits and whitespace.
pub const ALLOWED_PUNCTUATION: &[char] = &[
    '.', ',', ':', ';', '-', '\u{2013}', '(', ')', '[', ']', '{', '}', '\'', '"', '!', '@', '#',
    '$', '%', '^', '&', '*', '+', '=', '?', '/', '\\',
];

/// Characters that end a sentence when followed by whitespace or end of text.
pub const SENTENCE_TERMINATORS: &[char] = &['.', '?', '!', ETHIOPIC_FULL_STOP];

/// Returns true for codepoints in the Ethiopic block.
pub fn is_ethiopic(c: char) -> bool {
    ETHIOPIC_BLOCK.contains(&c)
}

pub fn is_noise_symbol(c: char) -> bool {
    NOISE_SYMBOLS.contains(&c)
}

pub fn is_sentence_terminator(c: char) -> bool {
    SENTENCE_TERMINATORS.contains(&c)
}

/// Returns true if the script extractor keeps `c`.
pub fn is_allowed(c: char) -> bool {
    is_ethiopic(c) || c.is_ascii_digit() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethiopic_block_bounds() {
        assert!(is_ethiopic('\u{1200}'));
        assert!(is_ethiopic('ሰ'));
        assert!(is_ethiopic('\u{137F}'));
        assert!(!is_ethiopic('\u{1380}'));
        assert!(!is_ethiopic('a'));
    }

    #[test]
    fn full_stop_is_terminator_and_ethiopic() {
        assert!(is_sentence_terminator(ETHIOPIC_FULL_STOP));
        assert!(is_ethiopic(ETHIOPIC_FULL_STOP));
        assert!(!is_sentence_terminator(','));
    }

    #[test]
    fn allow_list_rejects_latin_letters() {
        assert!(is_allowed('ሀ'));
        assert!(is_allowed('7'));
        assert!(is_allowed('\n'));
        assert!(is_allowed('\u{2013}'));
        assert!(!is_allowed('a'));
        assert!(!is_allowed('Z'));
        assert!(!is_allowed('\u{2022}'));
    }

    #[test]
    fn bullets_are_noise() {
        assert!(is_noise_symbol('\u{2022}'));
        assert!(is_noise_symbol('\u{25CF}'));
        assert!(!is_noise_symbol('.'));
        assert!(!is_noise_symbol(ETHIOPIC_FULL_STOP));
    }
}
