use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::alphabet::Alphabet;
use crate::permutation::Permutation;
use crate::rotor::Rotor;
use crate::{EnigmaError, Result};

/// A complete rotor machine: a catalog of available rotors, the slots they
/// are mounted in, and a plugboard.
///
/// Slot 0 holds the reflector; the remaining slots run left to right, and the
/// signal enters at the rightmost one.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    catalog: Vec<Rotor>,
    by_name: HashMap<String, usize>,
    slots: Vec<usize>,
    plugboard: Permutation,
}

impl Machine {
    /// A machine over `alphabet` with `num_rotors` slots, of which at most
    /// `pawls` may hold rotating rotors, choosing from `rotors`.
    ///
    /// # Errors
    /// [`EnigmaError::ConfigError`] unless `1 < num_rotors` and
    /// `pawls < num_rotors`, if two rotors share a name (ignoring case), or if
    /// a rotor is wired over a different alphabet.
    pub fn new(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        rotors: impl IntoIterator<Item = Rotor>,
    ) -> Result<Self> {
        if num_rotors <= 1 {
            return Err(EnigmaError::ConfigError(format!(
                "A machine needs more than one rotor slot, got {num_rotors}"
            )));
        }
        if pawls >= num_rotors {
            return Err(EnigmaError::ConfigError(format!(
                "{pawls} pawls do not fit {num_rotors} rotor slots"
            )));
        }

        let mut catalog = Vec::new();
        let mut by_name = HashMap::new();
        for rotor in rotors {
            if rotor.alphabet() != alphabet.as_ref() {
                return Err(EnigmaError::ConfigError(format!(
                    "Rotor {} is not wired over the machine alphabet",
                    rotor.name()
                )));
            }
            if by_name
                .insert(rotor.name().to_uppercase(), catalog.len())
                .is_some()
            {
                return Err(EnigmaError::ConfigError(format!(
                    "Duplicate rotor name {}",
                    rotor.name()
                )));
            }
            catalog.push(rotor);
        }
        debug!(num_rotors, pawls, available = catalog.len(), "machine built");

        let plugboard = Permutation::identity(alphabet.clone());
        Ok(Machine {
            alphabet,
            num_rotors,
            pawls,
            catalog,
            by_name,
            slots: Vec::new(),
            plugboard,
        })
    }

    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Names of every rotor in the catalog.
    pub fn rotor_names(&self) -> impl Iterator<Item = &str> {
        self.catalog.iter().map(Rotor::name)
    }

    /// Catalog lookup, ignoring case.
    pub fn rotor(&self, name: &str) -> Option<&Rotor> {
        self.by_name
            .get(&name.to_uppercase())
            .map(|&i| &self.catalog[i])
    }

    /// Names of the mounted rotors, reflector first. Empty until
    /// [`insert_rotors`](Self::insert_rotors) succeeds.
    pub fn slot_names(&self) -> Vec<&str> {
        self.slots.iter().map(|&i| self.catalog[i].name()).collect()
    }

    /// Current position of every mounted rotor as a character, reflector first.
    pub fn settings(&self) -> String {
        let chars = self.alphabet.chars();
        self.slots
            .iter()
            .map(|&i| chars[self.catalog[i].setting()])
            .collect()
    }

    /// Mounts the catalog rotors named by `names` (ignoring case), the
    /// reflector first. The mounted rotors return to setting and ring 0.
    ///
    /// Nothing changes unless every check passes.
    ///
    /// # Errors
    /// [`EnigmaError::ConfigError`] for a wrong number of names, an unknown or
    /// repeated name, a non-reflector in slot 0, a reflector anywhere else, or
    /// more rotating rotors than pawls.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::ConfigError(format!(
                "Expected {} rotors, got {}",
                self.num_rotors,
                names.len()
            )));
        }

        let mut slots = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let idx = *self
                .by_name
                .get(&name.to_uppercase())
                .ok_or_else(|| EnigmaError::ConfigError(format!("No rotor named {name}")))?;
            if slots.contains(&idx) {
                return Err(EnigmaError::ConfigError(format!(
                    "Rotor {name} used more than once"
                )));
            }
            slots.push(idx);
        }

        let reflector = &self.catalog[slots[0]];
        if !reflector.reflecting() {
            return Err(EnigmaError::ConfigError(format!(
                "The first rotor must reflect, {} does not",
                reflector.name()
            )));
        }
        if let Some(misplaced) = slots[1..].iter().find(|&&i| self.catalog[i].reflecting()) {
            return Err(EnigmaError::ConfigError(format!(
                "Reflector {} can only go in the first slot",
                self.catalog[*misplaced].name()
            )));
        }
        // Fewer rotating rotors than pawls is accepted.
        let moving = slots[1..]
            .iter()
            .filter(|&&i| self.catalog[i].rotates())
            .count();
        if moving > self.pawls {
            return Err(EnigmaError::ConfigError(format!(
                "{moving} moving rotors but only {} pawls",
                self.pawls
            )));
        }

        for &i in &slots {
            self.catalog[i].reset();
        }
        self.slots = slots;
        debug!(slots = ?self.slot_names(), "rotors inserted");
        Ok(())
    }

    /// Turns the non-reflector rotors to the positions in `setting`, which
    /// holds one upper-case alphabet character per slot, leftmost first.
    pub fn set_rotors(&mut self, setting: &str) -> Result<()> {
        let positions = self.positions(setting, "setting")?;
        for (&slot, posn) in self.slots[1..].iter().zip(positions) {
            self.catalog[slot].set(posn)?;
        }
        debug!(setting, "rotors set");
        Ok(())
    }

    /// Ring settings for the non-reflector rotors, in the format of
    /// [`set_rotors`](Self::set_rotors).
    pub fn set_rings(&mut self, rings: &str) -> Result<()> {
        let positions = self.positions(rings, "ring setting")?;
        for (&slot, ring) in self.slots[1..].iter().zip(positions) {
            self.catalog[slot].set_ring(ring)?;
        }
        debug!(rings, "rings set");
        Ok(())
    }

    fn positions(&self, setting: &str, what: &str) -> Result<Vec<usize>> {
        self.require_rotors()?;
        let expected = self.num_rotors - 1;
        if setting.chars().count() != expected {
            return Err(EnigmaError::ConfigError(format!(
                "{what} '{setting}' must have {expected} characters"
            )));
        }
        setting
            .chars()
            .map(|c| {
                if c.is_lowercase() {
                    return Err(EnigmaError::ConfigError(format!(
                        "{what} '{setting}' must be upper case"
                    )));
                }
                self.alphabet.to_int(c).map_err(|_| {
                    EnigmaError::ConfigError(format!(
                        "{what} '{setting}' uses '{c}', which is not in the alphabet"
                    ))
                })
            })
            .collect()
    }

    /// # Errors
    /// [`EnigmaError::ConfigError`] if `plugboard` is wired over a different
    /// alphabet.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<()> {
        if plugboard.alphabet() != &self.alphabet {
            return Err(EnigmaError::ConfigError(format!(
                "Plugboard {plugboard} is not wired over the machine alphabet"
            )));
        }
        debug!(%plugboard, "plugboard set");
        self.plugboard = plugboard;
        Ok(())
    }

    fn require_rotors(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(EnigmaError::ConfigError("No rotors inserted".into()));
        }
        Ok(())
    }

    /// Decides which rotors move from the positions before anything moves,
    /// then moves them. A rotor whose right neighbour sits at a notch moves
    /// along with that neighbour, which is what makes a middle rotor step on
    /// two consecutive key presses.
    fn advance_rotors(&mut self) {
        let last = self.slots.len() - 1;
        let mut marked = vec![false; self.slots.len()];
        marked[last] = true;
        for i in 1..last {
            if self.catalog[self.slots[i]].rotates() && self.catalog[self.slots[i + 1]].at_notch() {
                marked[i] = true;
                marked[i + 1] = true;
            }
        }

        for (&slot, &advance) in self.slots.iter().zip(&marked) {
            if advance {
                self.catalog[slot].advance();
            }
        }
        trace!(settings = %self.settings(), "stepped");
    }

    /// Steps the rotors, then sends contact `c` through plugboard, rotors,
    /// reflector and back.
    pub fn convert(&mut self, c: usize) -> Result<usize> {
        self.require_rotors()?;
        if c >= self.alphabet.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: c,
                size: self.alphabet.size(),
            });
        }

        self.advance_rotors();

        let mut x = self.plugboard.permute(c as isize);
        for &slot in self.slots[1..].iter().rev() {
            x = self.catalog[slot].convert_forward(x);
        }
        x = self.catalog[self.slots[0]].convert_forward(x);
        for &slot in &self.slots[1..] {
            x = self.catalog[slot].convert_backward(x);
        }
        Ok(self.plugboard.invert(x as isize))
    }

    /// Character form of [`convert`](Self::convert). A character outside the
    /// alphabet fails before the rotors move.
    pub fn convert_char(&mut self, c: char) -> Result<char> {
        let idx = self.alphabet.to_int(c)?;
        let out = self.convert(idx)?;
        self.alphabet.to_char(out)
    }

    /// Converts every non-blank character of `msg`, upper-cased, and joins
    /// the results without spaces.
    pub fn convert_message(&mut self, msg: &str) -> Result<String> {
        let mut out = String::with_capacity(msg.len());
        for word in msg.split_whitespace() {
            for c in word.chars().flat_map(char::to_uppercase) {
                out.push(self.convert_char(c)?);
            }
        }
        Ok(out)
    }
}
