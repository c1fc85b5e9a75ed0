//! Sentence segmentation tuned to Amharic punctuation.
//!
//! A sentence boundary is a whitespace run that directly follows one of
//! `.` `?` `!` `።`. The terminator stays attached to the sentence before
//! it; the whitespace run is consumed. Pieces are trimmed and empty pieces
//! are skipped.

use crate::charset;

/// Lazy iterator over the sentences of a text. See [`sentences`].
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

/// Iterate over the sentences in `text`, in source order.
///
/// Text without any terminator yields a single sentence (the trimmed text),
/// or nothing if the text is blank.
pub fn sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Collect [`sentences`] into owned strings.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentences(text).map(str::to_string).collect()
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while !self.rest.is_empty() {
            let (piece, rest) = split_at_boundary(self.rest);
            self.rest = rest;
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        None
    }
}

/// Split off everything up to the first boundary. The returned remainder
/// starts after the boundary's whitespace run.
fn split_at_boundary(text: &str) -> (&str, &str) {
    let mut after_terminator = false;
    for (i, c) in text.char_indices() {
        if after_terminator && c.is_whitespace() {
            return (&text[..i], text[i..].trim_start());
        }
        after_terminator = charset::is_sentence_terminator(c);
    }
    (text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_amharic_and_latin_terminators() {
        let got = split_sentences("ሰላም ነው። እንደምን አለህ? ደህና ነኝ።");
        assert_eq!(got, vec!["ሰላም ነው።", "እንደምን አለህ?", "ደህና ነኝ።"]);
    }

    #[test]
    fn terminator_without_whitespace_does_not_split() {
        let got = split_sentences("3.14 ነው።ቀጣይ ክፍል! መጨረሻ");
        assert_eq!(got, vec!["3.14 ነው።ቀጣይ ክፍል!", "መጨረሻ"]);
    }

    #[test]
    fn whitespace_runs_and_newlines_are_consumed() {
        let got = split_sentences("  አንድ።\n\n  ሁለት.\t ሶስት  ");
        assert_eq!(got, vec!["አንድ።", "ሁለት.", "ሶስት"]);
    }

    #[test]
    fn no_terminator_yields_whole_text() {
        assert_eq!(split_sentences("  ያለ ማቆሚያ ጽሑፍ  "), vec!["ያለ ማቆሚያ ጽሑፍ"]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn rejoining_reproduces_single_spaced_input() {
        let text = "ሀገር ሰላም ነው። ሕዝቡ ደስተኛ ነው! ለምን? ስለዚህ. መጨረሻ";
        let joined = sentences(text).collect::<Vec<_>>().join(" ");
        assert_eq!(joined, text);
    }

    #[test]
    fn rejoining_keeps_every_word_in_order() {
        let inputs = [
            "ሀገር ሰላም ነው። ሕዝቡ ደስተኛ ነው! ለምን? ስለዚህ. መጨረሻ",
            "አንድ።\nሁለት።\n\nሶስት",
            "ነው።። ቀጣይ ክፍል!! መጨረሻ።",
            "ነው። ። ቀጣይ",
            "  መጀመሪያ ክፍል?\t\tሁለተኛ ክፍል.   ",
            "ያለ ማቆሚያ\nጽሑፍ",
            "3.14 ነው።ቀጣይ ክፍል። \n ",
        ];
        for text in inputs {
            let pieces: Vec<&str> = sentences(text).collect();
            assert!(
                pieces.iter().all(|s| !s.is_empty() && s.trim() == *s),
                "untrimmed piece in {:?}",
                text
            );
            let joined = pieces.join(" ");
            let words: Vec<&str> = joined.split_whitespace().collect();
            assert_eq!(words, text.split_whitespace().collect::<Vec<_>>(), "input {:?}", text);
        }
    }

    #[test]
    fn iterator_is_restartable() {
        let text = "አንድ። ሁለት።";
        let it = sentences(text);
        let first: Vec<_> = it.clone().collect();
        let second: Vec<_> = it.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
