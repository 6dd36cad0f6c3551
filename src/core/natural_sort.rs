//! Human-friendly file name ordering
//!
//! Splits a name into runs of digits and runs of everything else, then
//! compares the runs position by position: digit runs by numeric value,
//! text runs case-insensitively. "track2.mp3" therefore sorts before
//! "track10.mp3".

use std::cmp::Ordering;

/// One run of a sort key
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Digits with leading zeros removed (empty string means zero)
    Number(String),
    /// Lowercased text
    Text(String),
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Compare by length first so arbitrarily long digit runs never overflow
            (Token::Number(a), Token::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key for a file name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Token>);

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut chars = name.chars().peekable();

        while let Some(&first) = chars.peek() {
            let is_digit = first.is_ascii_digit();
            let mut run = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() != is_digit {
                    break;
                }
                run.push(c);
                chars.next();
            }

            if is_digit {
                tokens.push(Token::Number(run.trim_start_matches('0').to_string()));
            } else {
                tokens.push(Token::Text(run.to_lowercase()));
            }
        }

        Self(tokens)
    }
}

/// Compare two names in natural order
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalKey::new(a).cmp(&NaturalKey::new(b))
}

/// Stable natural sort of arbitrary items by a name accessor
///
/// Items whose keys compare equal keep their incoming order.
pub fn natural_sort_by_key<T, F>(items: &mut [T], name: F)
where
    F: Fn(&T) -> String,
{
    items.sort_by_cached_key(|item| NaturalKey::new(&name(item)));
}
