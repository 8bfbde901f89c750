//! Phonetic codes used as a coarse gate before similarity scoring
//!
//! Strings that sound alike under common spelling variation ("Jon",
//! "John", "Joan") collapse to the same code. The code is never a
//! similarity metric on its own.

/// Code produced for input with no letters at all (empty, digits only).
pub const EMPTY_CODE: &str = "0000";

/// Pluggable phonetic encoder.
pub trait PhoneticEncoder: Send + Sync {
    /// Encode `s`. Must be pure and case-insensitive, and must return a
    /// fixed code for empty input.
    fn encode(&self, s: &str) -> String;

    /// Name of the algorithm for logging
    fn name(&self) -> &'static str;

    /// Whether two strings share the same code.
    fn same_code(&self, a: &str, b: &str) -> bool {
        self.encode(a) == self.encode(b)
    }
}

/// American Soundex encoder.
///
/// Stateless encoder - all instances are equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Soundex;

impl Soundex {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PhoneticEncoder for Soundex {
    fn encode(&self, s: &str) -> String {
        soundex(s)
    }

    fn name(&self) -> &'static str {
        "soundex"
    }
}

#[inline]
fn soundex_class(c: char) -> char {
    match c {
        'B' | 'F' | 'P' | 'V' => '1',
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => '2',
        'D' | 'T' => '3',
        'L' => '4',
        'M' | 'N' => '5',
        'R' => '6',
        _ => '0', // A, E, I, O, U, H, W, Y
    }
}

/// Encode a string using American Soundex.
///
/// Returns a 4-character code: first letter + 3 digits. Non-letters are
/// skipped; input without any ASCII letter encodes to [`EMPTY_CODE`].
///
/// # Examples
/// ```
/// use fuzzydup::algorithms::phonetic::{soundex, EMPTY_CODE};
///
/// assert_eq!(soundex("Robert"), "R163");
/// assert_eq!(soundex("Rupert"), "R163");
/// assert_eq!(soundex("Jon"), soundex("John"));
/// assert_eq!(soundex(""), EMPTY_CODE);
/// assert_eq!(soundex("555-1234"), EMPTY_CODE);
/// ```
#[must_use]
pub fn soundex(s: &str) -> String {
    let letters: Vec<char> = s
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let Some((&first, rest)) = letters.split_first() else {
        return EMPTY_CODE.to_string();
    };

    let mut code = String::with_capacity(4);
    code.push(first);

    let mut prev_class = soundex_class(first);

    for &c in rest {
        if code.len() >= 4 {
            break;
        }

        // H and W neither emit nor separate equal classes
        if matches!(c, 'H' | 'W') {
            continue;
        }

        let class = soundex_class(c);
        if class != '0' && class != prev_class {
            code.push(class);
        }

        // Vowels reset adjacency
        prev_class = class;
    }

    while code.len() < 4 {
        code.push('0');
    }

    code
}
