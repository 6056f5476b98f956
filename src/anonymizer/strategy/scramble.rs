//! Character-class-preserving scrambler.
//!
//! Lowercase letters become random lowercase letters, uppercase stays
//! uppercase, digits stay digits, symbols become symbols and whitespace is
//! kept verbatim. This is the generic strategy for text columns and for any
//! type without a dedicated handler.

use super::{Strategy, TypeClass, ValueError};
use rand::{Rng, RngCore};

pub(crate) const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub(crate) const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub(crate) const DIGITS: &[u8] = b"0123456789";
pub(crate) const SYMBOLS: &[u8] = b"!@#$%^&*()_-~`\"',./<>?:;\\|[]{}";
/// Alphabet for padding characters
const ANY: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_-~`\"',./<>?:;\\|[]{}";

/// Pick a random character from an ASCII alphabet
pub(crate) fn pick(alphabet: &[u8], rng: &mut dyn RngCore) -> char {
    alphabet[rng.random_range(0..alphabet.len())] as char
}

/// Replace one character with a random character of the same class
pub fn scramble_char(c: char, rng: &mut dyn RngCore) -> char {
    if c.is_ascii_lowercase() {
        pick(LOWERCASE, rng)
    } else if c.is_ascii_uppercase() {
        pick(UPPERCASE, rng)
    } else if c.is_ascii_digit() {
        pick(DIGITS, rng)
    } else if c.is_whitespace() {
        c
    } else if c.is_ascii_punctuation() {
        pick(SYMBOLS, rng)
    } else if c.is_uppercase() {
        pick(UPPERCASE, rng)
    } else if c.is_alphabetic() {
        pick(LOWERCASE, rng)
    } else if c.is_numeric() {
        pick(DIGITS, rng)
    } else {
        pick(SYMBOLS, rng)
    }
}

/// Random characters added around the scrambled value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrambleOptions {
    pub padding_before: usize,
    pub padding_after: usize,
}

/// Apply `map` to every character and add padding drawn from `pad_alphabet`
pub(crate) fn scramble_with<F>(
    value: &str,
    options: ScrambleOptions,
    pad_alphabet: &[u8],
    rng: &mut dyn RngCore,
    mut map: F,
) -> String
where
    F: FnMut(char, &mut dyn RngCore) -> char,
{
    let mut result =
        String::with_capacity(value.len() + options.padding_before + options.padding_after);

    for _ in 0..options.padding_before {
        result.push(pick(pad_alphabet, rng));
    }
    for c in value.chars() {
        result.push(map(c, rng));
    }
    for _ in 0..options.padding_after {
        result.push(pick(pad_alphabet, rng));
    }

    result
}

/// Scramble a string without padding
pub fn scramble_str(value: &str, rng: &mut dyn RngCore) -> String {
    scramble_with(value, ScrambleOptions::default(), ANY, rng, scramble_char)
}

/// Strategy for text columns and the fallback for unknown types
#[derive(Debug, Clone)]
pub struct ScrambleStrategy {
    class: TypeClass,
    options: ScrambleOptions,
}

impl ScrambleStrategy {
    pub fn new(class: TypeClass) -> Self {
        Self {
            class,
            options: ScrambleOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScrambleOptions) -> Self {
        self.options = options;
        self
    }
}

impl Strategy for ScrambleStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        Ok(scramble_with(value, self.options, ANY, rng, scramble_char))
    }

    fn class(&self) -> TypeClass {
        self.class
    }
}
