// Text normalization: NFC, tokenization over the Azerbaijani alphabet, case
// folding and diacritic stripping.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// Letters outside ASCII that belong to the Azerbaijani alphabet (composed form).
const ALPHABET_EXTRA: &[char] = &[
    'Ç', 'Ə', 'Ğ', 'İ', 'Ö', 'Ş', 'Ü', 'ç', 'ə', 'ğ', 'ı', 'ö', 'ş', 'ü',
];

/// True for characters that may appear inside a token.
///
/// This is an explicit class rather than `char::is_alphanumeric`, so that
/// punctuation-like letters from other scripts never join a token.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALPHABET_EXTRA.contains(&c)
}

/// Fold a single token into the canonical form used by the lexicon:
/// lowercase, decompose, drop combining marks, recompose.
///
/// ```
/// use azmorph_lib::normalize::fold;
///
/// assert_eq!(fold("YAZDI"), "yazdi");
/// assert_eq!(fold("Gördüm"), "gordum");
/// assert_eq!(fold("yazdı"), "yazdı");
/// ```
pub fn fold(token: &str) -> String {
    let lower = token.to_lowercase();
    lower
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .nfc()
        .collect()
}

/// Split raw text into folded tokens, in order of appearance.
///
/// The returned iterator is lazy; clone it to restart from the beginning.
pub fn normalize(raw: &str) -> Tokens {
    Tokens {
        text: raw.nfc().collect(),
        pos: 0,
    }
}

/// Lazy token sequence produced by [`normalize`].
#[derive(Debug, Clone)]
pub struct Tokens {
    text: String,
    /// Byte offset of the next unread character.
    pos: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.text[self.pos..];
        let start = rest.find(is_token_char)?;
        let run = &rest[start..];
        let len = run.find(|c: char| !is_token_char(c)).unwrap_or(run.len());
        self.pos += start + len;
        Some(fold(&run[..len]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_in_order() {
        let tokens: Vec<String> = normalize("Kitablar, evdə; uşaqlar!").collect();
        assert_eq!(tokens, vec!["kitablar", "evdə", "usaqlar"]);
    }

    #[test]
    fn test_digits_are_token_chars() {
        let tokens: Vec<String> = normalize("2024-cü il").collect();
        assert_eq!(tokens, vec!["2024", "cu", "il"]);
    }

    #[test]
    fn test_decomposed_input_is_composed_first() {
        // "ş" written as s + combining cedilla.
        let tokens: Vec<String> = normalize("us\u{0327}aq").collect();
        assert_eq!(tokens, vec!["usaq"]);
    }

    #[test]
    fn test_foreign_letters_split_tokens() {
        let tokens: Vec<String> = normalize("evдə").collect();
        assert_eq!(tokens, vec!["ev", "ə"]);
    }

    #[test]
    fn test_restartable() {
        let tokens = normalize("bir iki üç");
        let first: Vec<String> = tokens.clone().collect();
        let second: Vec<String> = tokens.collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["bir", "iki", "uc"]);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(normalize("").count(), 0);
        assert_eq!(normalize(" ,.;!? ").count(), 0);
    }

    #[test]
    fn test_fold_dotted_capital_i() {
        assert_eq!(fold("İl"), "il");
    }

    #[test]
    fn test_fold_keeps_schwa_and_dotless_i() {
        assert_eq!(fold("ƏLI"), "əli");
        assert_eq!(fold("qız"), "qız");
    }
}
