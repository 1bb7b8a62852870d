//! Machine descriptions and setup lines.
//!
//! A description names the alphabet, the slot and pawl counts, and the
//! available rotors:
//!
//! ```text
//! A-Z
//! 5 3
//! I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP)
//!           (RX) (SZ) (TV)
//! ```
//!
//! A line starting with `(` continues the wiring of the rotor above it.

use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;
use crate::{EnigmaError, Result};

/// The type column of a rotor description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorCategory {
    /// `M` followed by the notch characters.
    Moving(String),
    /// `N`.
    Fixed,
    /// `R`.
    Reflector,
}

/// One rotor of a machine description, before its wiring is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotorDescription {
    pub name: String,
    pub category: RotorCategory,
    pub cycles: String,
}

impl RotorDescription {
    pub fn build(&self, alphabet: &Arc<Alphabet>) -> Result<Rotor> {
        let perm = Permutation::new(&self.cycles, alphabet.clone())?;
        match &self.category {
            RotorCategory::Moving(notches) => Rotor::moving(self.name.as_str(), perm, notches),
            RotorCategory::Fixed => Ok(Rotor::fixed(self.name.as_str(), perm)),
            RotorCategory::Reflector => Rotor::reflector(self.name.as_str(), perm),
        }
    }
}

impl FromStr for RotorDescription {
    type Err = EnigmaError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| EnigmaError::ParseError("Empty rotor description".into()))?;
        let kind = parts
            .next()
            .ok_or_else(|| EnigmaError::ParseError(format!("Rotor {name} has no type")))?;
        let category = match kind.chars().next() {
            Some('M') => RotorCategory::Moving(kind[1..].to_string()),
            Some('N') => RotorCategory::Fixed,
            Some('R') => RotorCategory::Reflector,
            _ => {
                return Err(EnigmaError::ConfigError(format!(
                    "Rotor {name} has unknown type '{kind}'"
                )))
            }
        };
        Ok(RotorDescription {
            name: name.to_string(),
            category,
            cycles: parts.collect::<Vec<_>>().join(" "),
        })
    }
}

/// A parsed machine description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub alphabet: Arc<Alphabet>,
    pub num_rotors: usize,
    pub pawls: usize,
    pub rotors: Vec<RotorDescription>,
}

impl MachineConfig {
    pub fn build(&self) -> Result<Machine> {
        let rotors = self
            .rotors
            .iter()
            .map(|desc| desc.build(&self.alphabet))
            .collect::<Result<Vec<_>>>()?;
        Machine::new(self.alphabet.clone(), self.num_rotors, self.pawls, rotors)
    }
}

fn truncated() -> EnigmaError {
    EnigmaError::ConfigError("Configuration file truncated".into())
}

impl FromStr for MachineConfig {
    type Err = EnigmaError;

    fn from_str(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let alphabet: Alphabet = lines.next().ok_or_else(truncated)?.parse()?;

        let mut counts = Vec::with_capacity(2);
        while counts.len() < 2 {
            let line = lines.next().ok_or_else(truncated)?;
            for token in line.split_whitespace() {
                if counts.len() == 2 {
                    return Err(EnigmaError::ParseError(format!(
                        "Unexpected '{token}' after rotor and pawl counts"
                    )));
                }
                let count = token.parse::<usize>().map_err(|_| {
                    EnigmaError::ParseError(format!("Expected a count, found '{token}'"))
                })?;
                counts.push(count);
            }
        }

        let mut rotors: Vec<RotorDescription> = Vec::new();
        for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
            if line.starts_with('(') {
                let last = rotors.last_mut().ok_or_else(|| {
                    EnigmaError::ParseError(format!("Wiring '{line}' does not follow a rotor"))
                })?;
                last.cycles.push(' ');
                last.cycles.push_str(line);
            } else {
                rotors.push(line.parse()?);
            }
        }
        if rotors.is_empty() {
            return Err(truncated());
        }
        debug!(alphabet = %alphabet, rotors = rotors.len(), "machine description read");

        Ok(MachineConfig {
            alphabet: Arc::new(alphabet),
            num_rotors: counts[0],
            pawls: counts[1],
            rotors,
        })
    }
}

/// Reads a machine description from `reader` and builds the machine.
pub fn read_machine<R: Read>(mut reader: R) -> Result<Machine> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    text.parse::<MachineConfig>()?.build()
}

/// A parsed `* NAMES... SETTING [RINGS] [PLUGBOARD]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setup {
    pub names: Vec<String>,
    pub setting: String,
    pub rings: Option<String>,
    pub plugboard: String,
}

impl Setup {
    /// Parses a setup line for a machine with `num_rotors` slots.
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self> {
        let body = line.trim().strip_prefix('*').ok_or_else(|| {
            EnigmaError::ParseError(format!("Setup line must start with '*': '{line}'"))
        })?;
        let (head, plugboard) = match body.find('(') {
            Some(at) => body.split_at(at),
            None => (body, ""),
        };

        let mut tokens: Vec<&str> = head.split_whitespace().collect();
        if tokens.len() < num_rotors + 1 {
            return Err(EnigmaError::ConfigError(format!(
                "Setup line needs {num_rotors} rotor names and a setting: '{line}'"
            )));
        }
        if tokens.len() > num_rotors + 2 {
            return Err(EnigmaError::ParseError(format!(
                "Unexpected '{}' in setup line",
                tokens[num_rotors + 2]
            )));
        }
        let rings = (tokens.len() == num_rotors + 2)
            .then(|| tokens.remove(num_rotors + 1).to_string());
        let setting = tokens.remove(num_rotors).to_string();

        Ok(Setup {
            names: tokens.into_iter().map(str::to_string).collect(),
            setting,
            rings,
            plugboard: plugboard.trim().to_string(),
        })
    }

    /// Mounts, sets and plugs `machine` as this line describes. On error
    /// `machine` keeps its previous configuration.
    pub fn apply(&self, machine: &mut Machine) -> Result<()> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet().clone())?;
        let mut staged = machine.clone();
        staged.insert_rotors(&self.names)?;
        staged.set_rotors(&self.setting)?;
        if let Some(rings) = &self.rings {
            staged.set_rings(rings)?;
        }
        staged.set_plugboard(plugboard)?;
        *machine = staged;
        debug!(names = ?self.names, setting = %self.setting, "setup applied");
        Ok(())
    }
}
