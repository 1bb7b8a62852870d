use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{EnigmaError, Result};

/// The ordered set of characters a machine can encode, each paired with
/// its contact position `0..size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    index_map: HashMap<char, usize>,
}

impl Alphabet {
    /// An alphabet of explicitly listed characters, in the given order.
    pub fn new(chars: &[char]) -> Result<Self> {
        if chars.is_empty() {
            return Err(EnigmaError::ConfigError("Alphabet must not be empty".into()));
        }
        let mut index_map = HashMap::with_capacity(chars.len());
        for (i, &c) in chars.iter().enumerate() {
            if index_map.insert(c, i).is_some() {
                return Err(EnigmaError::ConfigError(format!(
                    "Duplicate character '{c}' in alphabet"
                )));
            }
        }
        Ok(Alphabet {
            chars: chars.to_vec(),
            index_map,
        })
    }

    /// All characters from `first` to `last` inclusive. Both bounds are
    /// upper-cased first, so `range('a', 'z')` is the usual `A-Z`.
    pub fn range(first: char, last: char) -> Result<Self> {
        let first = to_upper(first);
        let last = to_upper(last);
        if first > last {
            return Err(EnigmaError::ConfigError(format!(
                "Empty range of characters {first}-{last}"
            )));
        }
        let chars: Vec<char> = (first..=last).collect();
        Self::new(&chars)
    }

    pub fn size(&self) -> usize {
        self.chars.len()
    }

    pub fn contains(&self, c: char) -> bool {
        self.index_map.contains_key(&c)
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character at contact position `index`.
    pub fn to_char(&self, index: usize) -> Result<char> {
        self.chars
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Contact position of `c`; the inverse of [`to_char`](Self::to_char).
    pub fn to_int(&self, c: char) -> Result<usize> {
        self.index_map
            .get(&c)
            .copied()
            .ok_or(EnigmaError::CharNotInAlphabet(c))
    }
}

fn to_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Parses the alphabet line of a machine description: `A-Z` names a range by
/// its first and last characters, anything else lists the characters.
impl FromStr for Alphabet {
    type Err = EnigmaError;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim();
        if line.contains('-') {
            let mut chars = line.chars();
            match (chars.next(), chars.next_back()) {
                (Some(first), Some(last)) => Alphabet::range(first, last),
                _ => Err(EnigmaError::ParseError(format!(
                    "Malformed alphabet range '{line}'"
                ))),
            }
        } else {
            let chars: Vec<char> = line.chars().collect();
            Alphabet::new(&chars)
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
