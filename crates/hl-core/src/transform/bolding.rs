//! Word segmentation and bold-prefix lengths
//!
//! A word is a run of ASCII letters and digits; everything else is kept
//! verbatim. No dictionary, no locale.

/// Upper bound on bolded letters for long words
pub const MAX_BOLD: usize = 6;

/// Number of leading characters to bold for a word of `len` characters
pub fn bold_length(len: usize) -> usize {
    match len {
        0 => 0,
        1..=3 => 1,
        4..=6 => ceil_two_fifths(len).clamp(2, 3),
        _ => ceil_two_fifths(len).min(MAX_BOLD),
    }
}

/// Number of leading characters to bold in `word`
pub fn letters_for_word(word: &str) -> usize {
    let len = word.chars().count();
    bold_length(len).min(len)
}

// ceil(len * 0.4) without floating point
fn ceil_two_fifths(len: usize) -> usize {
    (len * 2).div_ceil(5)
}

/// A piece of a text leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Non-word characters, emitted verbatim
    Gap(&'a str),
    /// A word split into its bolded head and plain tail
    Word {
        /// Styled prefix
        head: &'a str,
        /// Remaining characters (may be empty)
        tail: &'a str,
    },
}

impl Segment<'_> {
    /// Text this segment stands for
    pub fn len(&self) -> usize {
        match self {
            Self::Gap(text) => text.len(),
            Self::Word { head, tail } => head.len() + tail.len(),
        }
    }

    /// Whether the segment is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Split `text` into alternating gaps and words
///
/// Concatenating every gap and every word's head + tail yields `text`.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let gap_len = rest.find(is_word_char).unwrap_or(rest.len());
        if gap_len > 0 {
            segments.push(Segment::Gap(&rest[..gap_len]));
            rest = &rest[gap_len..];
            continue;
        }

        let word_len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
        let word = &rest[..word_len];
        // Word characters are ASCII, so char counts are byte offsets
        let (head, tail) = word.split_at(letters_for_word(word));
        segments.push(Segment::Word { head, tail });
        rest = &rest[word_len..];
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_lengths() {
        assert_eq!(letters_for_word("ab"), 1);
        assert_eq!(letters_for_word("cat"), 1);
        assert_eq!(letters_for_word("word"), 2);
        assert_eq!(letters_for_word("bread"), 2);
        assert_eq!(letters_for_word("banana"), 3);
        assert_eq!(letters_for_word("reading"), 3);
        assert_eq!(letters_for_word("elephants"), 4);
        assert_eq!(letters_for_word("extraordinary"), 6);
        assert_eq!(letters_for_word("internationalization"), 6);
        assert_eq!(letters_for_word(""), 0);
    }

    #[test]
    fn test_bold_length_table() {
        let expected = [0, 1, 1, 1, 2, 2, 3, 3, 4, 4, 4, 5, 5, 6, 6, 6, 6];
        for (len, &n) in expected.iter().enumerate() {
            assert_eq!(bold_length(len), n, "length {len}");
        }
    }

    #[test]
    fn test_segment_words_and_gaps() {
        let segments = segment("Hi, world!");
        assert_eq!(
            segments,
            vec![
                Segment::Word { head: "H", tail: "i" },
                Segment::Gap(", "),
                Segment::Word { head: "wo", tail: "rld" },
                Segment::Gap("!"),
            ]
        );
    }

    #[test]
    fn test_segment_non_ascii_is_gap() {
        let segments = segment("café 42");
        assert_eq!(
            segments,
            vec![
                Segment::Word { head: "c", tail: "af" },
                Segment::Gap("é "),
                Segment::Word { head: "4", tail: "2" },
            ]
        );
    }

    #[test]
    fn test_segment_reassembles() {
        let text = "  The quick-brown fox\tjumps… over 13 lazy dogs.\n";
        let rebuilt: String = segment(text)
            .iter()
            .map(|s| match s {
                Segment::Gap(g) => g.to_string(),
                Segment::Word { head, tail } => format!("{head}{tail}"),
            })
            .collect();
        assert_eq!(rebuilt, text);
    }
}
