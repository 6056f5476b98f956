//! Hostname randomization within the RFC 1123 alphabet.

use super::scramble::{pick, scramble_with, ScrambleOptions, LOWERCASE};
use super::{Strategy, TypeClass, ValueError};
use rand::RngCore;

const LABEL_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Letters and digits become random lowercase letters or digits; `.` and
/// `-` stay where they are so label structure survives.
#[derive(Debug, Clone, Default)]
pub struct HostnameStrategy;

fn scramble_host_char(c: char, rng: &mut dyn RngCore) -> char {
    match c {
        '.' | '-' => c,
        c if c.is_whitespace() => c,
        _ => pick(LABEL_CHARS, rng),
    }
}

impl Strategy for HostnameStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        Ok(scramble_with(
            value,
            ScrambleOptions::default(),
            LOWERCASE,
            rng,
            scramble_host_char,
        ))
    }

    fn class(&self) -> TypeClass {
        TypeClass::Hostname
    }
}
