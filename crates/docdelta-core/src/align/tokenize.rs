//! Token streams for the aligner
//!
//! Tokens borrow from the input text; concatenating a stream yields the
//! input unchanged.

use super::Granularity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

/// Split `text` into tokens of the given granularity
pub fn tokenize(text: &str, granularity: Granularity) -> Vec<&str> {
    match granularity {
        Granularity::Character => characters(text),
        Granularity::Word => words(text),
    }
}

fn characters(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[i..i + c.len_utf8()])
        .collect()
}

/// Runs of alphanumerics, runs of whitespace, and every other code point on
/// its own.
fn words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (i, c) in text.char_indices() {
        let class = classify(c);
        match current {
            Some(prev) if prev == class && class != CharClass::Other => {}
            Some(_) => {
                tokens.push(&text[start..i]);
                start = i;
            }
            None => {}
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Whether a token counts as a word for context windows
pub fn is_word(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokens() {
        assert_eq!(
            tokenize("The quick, brown  fox!", Granularity::Word),
            vec!["The", " ", "quick", ",", " ", "brown", "  ", "fox", "!"]
        );
    }

    #[test]
    fn test_punctuation_is_never_merged() {
        assert_eq!(tokenize("--", Granularity::Word), vec!["-", "-"]);
    }

    #[test]
    fn test_character_tokens_are_code_points() {
        assert_eq!(
            tokenize("añb", Granularity::Character),
            vec!["a", "ñ", "b"]
        );
    }

    #[test]
    fn test_tokens_concatenate_to_input() {
        let text = "Über 3 Äpfel\t– sagt er.\n";
        for granularity in [Granularity::Word, Granularity::Character] {
            assert_eq!(tokenize(text, granularity).concat(), text);
        }
    }

    #[test]
    fn test_only_alphanumeric_runs_are_words() {
        assert!(is_word("fox"));
        assert!(is_word("42"));
        assert!(!is_word(","));
        assert!(!is_word("  "));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("", Granularity::Word).is_empty());
    }
}
