//! Enigma rotor machine simulator.
//!
//! A [`Machine`] mounts a reflector and a row of [`Rotor`]s chosen from a
//! catalog, each wired by a [`Permutation`] over a shared [`Alphabet`], and
//! encodes one character per key press: the rotors step, then the signal runs
//! through the plugboard, right to left through the rotors, off the
//! reflector, and back out. The same settings decode what they encode.
//!
//! [`config`] reads machine descriptions and setup lines; [`session`] drives
//! whole message files through a machine.

use thiserror::Error;

pub mod alphabet;
pub mod config;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod session;

pub use alphabet::Alphabet;
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorKind};

/// Errors that can occur while configuring or running a machine.
#[derive(Debug, Error)]
pub enum EnigmaError {
    #[error("Character '{0}' not in alphabet.")]
    CharNotInAlphabet(char),
    #[error("Index {index} out of range for alphabet of size {size}.")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Could not open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnigmaError>;
