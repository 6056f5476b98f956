//! Filesystem path randomization.

use super::scramble::{pick, scramble_with, ScrambleOptions, DIGITS, LOWERCASE, UPPERCASE};
use super::{Strategy, TypeClass, ValueError};
use rand::RngCore;

const NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Scramble path components while keeping separators, dots, dashes and
/// underscores. The output never contains whitespace.
#[derive(Debug, Clone, Default)]
pub struct PathnameStrategy;

fn scramble_path_char(c: char, rng: &mut dyn RngCore) -> char {
    match c {
        '.' | '-' | '_' | '/' | '\\' => c,
        c if c.is_ascii_lowercase() => pick(LOWERCASE, rng),
        c if c.is_ascii_uppercase() => pick(UPPERCASE, rng),
        c if c.is_ascii_digit() => pick(DIGITS, rng),
        _ => pick(NAME_CHARS, rng),
    }
}

impl Strategy for PathnameStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        Ok(scramble_with(
            value,
            ScrambleOptions::default(),
            NAME_CHARS,
            rng,
            scramble_path_char,
        ))
    }

    fn class(&self) -> TypeClass {
        TypeClass::Pathname
    }
}
