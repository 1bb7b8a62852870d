use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::{EnigmaError, Result};

/// A bijection over the contact positions of an [`Alphabet`], written in
/// cycle notation such as `"(AELTPHQXRU) (BKNW) (S)"`.
///
/// Characters that appear in no cycle map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    cycles: Vec<Vec<usize>>,
    wiring: Vec<usize>,
    inverse_wiring: Vec<usize>,
}

impl Permutation {
    /// Parses `cycles` over `alphabet`. Whitespace between and inside cycles
    /// is ignored.
    ///
    /// # Errors
    /// [`EnigmaError::ParseError`] for unbalanced or nested parentheses, text
    /// outside a cycle, an empty cycle, or a character used twice;
    /// [`EnigmaError::CharNotInAlphabet`] for a character the alphabet lacks.
    pub fn new(cycles: &str, alphabet: Arc<Alphabet>) -> Result<Self> {
        check_balanced(cycles)?;

        let mut parsed: Vec<Vec<usize>> = Vec::new();
        let mut seen = vec![false; alphabet.size()];
        let mut current: Option<Vec<usize>> = None;
        // Parentheses are balanced and unnested from here on.
        for c in cycles.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '(' => current = Some(Vec::new()),
                ')' => {
                    let cycle = current.take().unwrap_or_default();
                    if cycle.is_empty() {
                        return Err(EnigmaError::ParseError(format!(
                            "Empty cycle in '{cycles}'"
                        )));
                    }
                    parsed.push(cycle);
                }
                _ => {
                    let Some(cycle) = current.as_mut() else {
                        return Err(EnigmaError::ParseError(format!(
                            "Character '{c}' outside of a cycle in '{cycles}'"
                        )));
                    };
                    let idx = alphabet.to_int(c)?;
                    if seen[idx] {
                        return Err(EnigmaError::ParseError(format!(
                            "Character '{c}' appears more than once in '{cycles}'"
                        )));
                    }
                    seen[idx] = true;
                    cycle.push(idx);
                }
            }
        }

        Ok(Self::from_cycles(alphabet, parsed))
    }

    /// The permutation that maps every position to itself.
    pub fn identity(alphabet: Arc<Alphabet>) -> Self {
        Self::from_cycles(alphabet, Vec::new())
    }

    fn from_cycles(alphabet: Arc<Alphabet>, cycles: Vec<Vec<usize>>) -> Self {
        let size = alphabet.size();
        let mut wiring: Vec<usize> = (0..size).collect();
        for cycle in &cycles {
            for (i, &from) in cycle.iter().enumerate() {
                wiring[from] = cycle[(i + 1) % cycle.len()];
            }
        }

        let mut inverse_wiring = vec![0; size];
        for (i, &mapped) in wiring.iter().enumerate() {
            inverse_wiring[mapped] = i;
        }

        Permutation {
            alphabet,
            cycles,
            wiring,
            inverse_wiring,
        }
    }

    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// The cycles as parsed, as contact positions.
    pub fn cycles(&self) -> &[Vec<usize>] {
        &self.cycles
    }

    /// `p` reduced modulo the alphabet size into `0..size`.
    pub fn wrap(&self, p: isize) -> usize {
        p.rem_euclid(self.size() as isize) as usize
    }

    /// Successor of `p` (taken modulo the size) within its cycle.
    pub fn permute(&self, p: isize) -> usize {
        self.wiring[self.wrap(p)]
    }

    /// Predecessor of `c` (taken modulo the size) within its cycle.
    pub fn invert(&self, c: isize) -> usize {
        self.inverse_wiring[self.wrap(c)]
    }

    pub fn permute_char(&self, p: char) -> Result<char> {
        let idx = self.alphabet.to_int(p)?;
        self.alphabet.to_char(self.wiring[idx])
    }

    pub fn invert_char(&self, c: char) -> Result<char> {
        let idx = self.alphabet.to_int(c)?;
        self.alphabet.to_char(self.inverse_wiring[idx])
    }

    /// True iff no position maps to itself. Identity wirings and wirings
    /// with single-character cycles are never derangements.
    pub fn derangement(&self) -> bool {
        self.wiring.iter().enumerate().all(|(i, &mapped)| i != mapped)
    }
}

fn check_balanced(cycles: &str) -> Result<()> {
    let mut open = false;
    for c in cycles.chars() {
        match c {
            '(' if open => {
                return Err(EnigmaError::ParseError(format!(
                    "Nested '(' in '{cycles}'"
                )))
            }
            ')' if !open => {
                return Err(EnigmaError::ParseError(format!(
                    "Unmatched ')' in '{cycles}'"
                )))
            }
            '(' | ')' => open = !open,
            _ => {}
        }
    }
    if open {
        return Err(EnigmaError::ParseError(format!(
            "Unclosed '(' in '{cycles}'"
        )));
    }
    Ok(())
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars = self.alphabet.chars();
        for (n, cycle) in self.cycles.iter().enumerate() {
            if n > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for &idx in cycle {
                write!(f, "{}", chars[idx])?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Arc<Alphabet> {
        Arc::new(Alphabet::range('A', 'Z').expect("A-Z is a valid range"))
    }

    fn check_perm(perm: &Permutation, from: &str, to: &str) -> Result<()> {
        for (f, t) in from.chars().zip(to.chars()) {
            assert_eq!(perm.permute_char(f)?, t, "wrong permute of '{f}'");
            assert_eq!(perm.invert_char(t)?, f, "wrong invert of '{t}'");
        }
        Ok(())
    }

    #[test]
    fn test_identity_from_empty_string() -> Result<()> {
        let perm = Permutation::new("", upper())?;
        for i in 0..26 {
            assert_eq!(perm.permute(i), i as usize);
            assert_eq!(perm.invert(i), i as usize);
        }
        assert!(!perm.derangement());
        assert_eq!(perm, Permutation::identity(upper()));
        Ok(())
    }

    #[test]
    fn test_rotor_i_wiring() -> Result<()> {
        let perm = Permutation::new("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)", upper())?;
        check_perm(
            &perm,
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            "EKMFLGDQVZNTOWYHXUSPAIBRCJ",
        )
    }

    #[test]
    fn test_wraps_at_cycle_ends() -> Result<()> {
        let perm = Permutation::new("(PNH) (ABDFIKLZYXW) (JC)", upper())?;
        assert_eq!(perm.permute_char('H')?, 'P');
        assert_eq!(perm.permute_char('W')?, 'A');
        assert_eq!(perm.invert_char('B')?, 'A');
        assert_eq!(perm.invert_char('A')?, 'W');
        assert_eq!(perm.invert_char('G')?, 'G');
        assert_eq!(perm.invert(3), 1);
        Ok(())
    }

    #[test]
    fn test_indices_are_wrapped() -> Result<()> {
        let perm = Permutation::new("(AB)", upper())?;
        assert_eq!(perm.permute(26), 1);
        assert_eq!(perm.permute(-26), 1);
        assert_eq!(perm.permute(-25), 0);
        assert_eq!(perm.invert(27), 0);
        assert_eq!(perm.permute(-1), 25);
        Ok(())
    }

    #[test]
    fn test_whitespace_is_ignored() -> Result<()> {
        let spaced = Permutation::new("  ( A B C )(DE)  ", upper())?;
        let tight = Permutation::new("(ABC) (DE)", upper())?;
        assert_eq!(spaced, tight);
        Ok(())
    }

    #[test]
    fn test_derangement() -> Result<()> {
        let alpha = Arc::new(Alphabet::range('A', 'D')?);
        assert!(Permutation::new("(AC) (BD)", alpha.clone())?.derangement());
        assert!(Permutation::new("(ABCD)", alpha.clone())?.derangement());
        assert!(!Permutation::new("(ABC)", alpha.clone())?.derangement());
        assert!(!Permutation::new("(ABC) (D)", alpha.clone())?.derangement());
        assert!(!Permutation::new("", alpha)?.derangement());
        Ok(())
    }

    #[test]
    fn test_malformed_cycles_rejected() {
        for bad in ["(AB", "AB)", "(AB))", "((AB))", "(AB) C", "()", "(AB) (BC)"] {
            assert!(
                matches!(Permutation::new(bad, upper()), Err(EnigmaError::ParseError(_))),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn test_foreign_character_rejected() {
        assert!(matches!(
            Permutation::new("(A1)", upper()),
            Err(EnigmaError::CharNotInAlphabet('1'))
        ));
    }

    #[test]
    fn test_display_round_trips() -> Result<()> {
        let perm = Permutation::new("(AELTPHQXRU)(BKNW) (S)", upper())?;
        assert_eq!(perm.to_string(), "(AELTPHQXRU) (BKNW) (S)");
        assert_eq!(Permutation::new(&perm.to_string(), upper())?, perm);
        Ok(())
    }
}
