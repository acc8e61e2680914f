use crate::numerals;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[^\p{L}\p{M}\p{N}\s]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","is","in","to","a","an","of","for","and","on","with","that","as","are","was",
            "this","it","be","or","from","by","at","if","then","can","we","you","your","i","but",
            "have","has","had","not","do","does","did","so","such","these","those","he","she","they"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into index terms: NFKC normalization, lowercase, punctuation removal,
/// stopword removal, and spelling of all-digit tokens as English words.
///
/// Index building and query vectorization both go through this function.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let stripped = PUNCT.replace_all(&normalized, "");
    let mut tokens = Vec::new();
    for token in stripped.split_whitespace() {
        if is_stopword(token) { continue; }
        if numerals::is_numeral(token) {
            tokens.extend(numerals::spell(token).into_iter().map(str::to_string));
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}
