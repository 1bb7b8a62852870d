use crate::alphabet::Alphabet;
use crate::permutation::Permutation;
use crate::{EnigmaError, Result};

/// What a rotor does when the machine steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Rotates; reaching one of `notches` carries the rotor to its left.
    Moving { notches: Vec<usize> },
    /// Never rotates.
    Fixed,
    /// Leftmost, never rotates, wiring is a derangement.
    Reflector,
}

/// A wiring permutation mounted at a rotational setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
    ring: usize,
}

impl Rotor {
    /// A rotating rotor whose notches sit at the characters of `notches`.
    pub fn moving(
        name: impl Into<String>,
        permutation: Permutation,
        notches: &str,
    ) -> Result<Self> {
        let alphabet = permutation.alphabet();
        let notches = notches
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| alphabet.to_int(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::build(name.into(), permutation, RotorKind::Moving { notches }))
    }

    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Self::build(name.into(), permutation, RotorKind::Fixed)
    }

    /// # Errors
    /// [`EnigmaError::ConfigError`] unless `permutation` is a derangement.
    pub fn reflector(name: impl Into<String>, permutation: Permutation) -> Result<Self> {
        let name = name.into();
        if !permutation.derangement() {
            return Err(EnigmaError::ConfigError(format!(
                "Reflector {name} wiring {permutation} is not a derangement"
            )));
        }
        Ok(Self::build(name, permutation, RotorKind::Reflector))
    }

    fn build(name: String, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name,
            permutation,
            kind,
            setting: 0,
            ring: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.permutation.alphabet()
    }

    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    pub fn notches(&self) -> &[usize] {
        match &self.kind {
            RotorKind::Moving { notches } => notches.as_slice(),
            RotorKind::Fixed | RotorKind::Reflector => &[],
        }
    }

    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Turns the rotor to position `posn`. A reflector only has position 0.
    pub fn set(&mut self, posn: usize) -> Result<()> {
        self.check_position(posn, "position")?;
        self.setting = posn;
        Ok(())
    }

    pub fn set_char(&mut self, c: char) -> Result<()> {
        let posn = self.alphabet().to_int(c)?;
        self.set(posn)
    }

    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Moves the wiring core against the lettered ring (Ringstellung).
    pub fn set_ring(&mut self, ring: usize) -> Result<()> {
        self.check_position(ring, "ring setting")?;
        self.ring = ring;
        Ok(())
    }

    fn check_position(&self, posn: usize, what: &str) -> Result<()> {
        if posn >= self.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: posn,
                size: self.size(),
            });
        }
        if self.reflecting() && posn != 0 {
            return Err(EnigmaError::ConfigError(format!(
                "Reflector {} has only one {what}",
                self.name
            )));
        }
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.setting = 0;
        self.ring = 0;
    }

    /// Signal entering contact `p` from the right, leaving on the left.
    pub fn convert_forward(&self, p: usize) -> usize {
        let shift = self.shift();
        let mapped = self.permutation.permute(p as isize + shift);
        self.permutation.wrap(mapped as isize - shift)
    }

    /// Signal entering contact `e` from the left, leaving on the right.
    pub fn convert_backward(&self, e: usize) -> usize {
        let shift = self.shift();
        let mapped = self.permutation.invert(e as isize + shift);
        self.permutation.wrap(mapped as isize - shift)
    }

    fn shift(&self) -> isize {
        self.setting as isize - self.ring as isize
    }

    /// One step forward. Only moving rotors turn.
    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    pub fn at_notch(&self) -> bool {
        self.notches().contains(&self.setting)
    }
}
