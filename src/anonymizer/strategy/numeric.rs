//! Digit scrambling for integer and float columns.

use super::scramble::{pick, scramble_str, DIGITS};
use super::{Strategy, TypeClass, ValueError};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;

const NONZERO_DIGITS: &[u8] = b"123456789";

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

/// Replace every mantissa digit of a numeric literal with a random digit,
/// keeping the sign, the decimal point and the whole exponent in place.
///
/// A leading digit that was non-zero stays non-zero so the result has the
/// same magnitude as the input.
pub(crate) fn scramble_digits(value: &str, rng: &mut dyn RngCore) -> String {
    let mut seen_digit = false;
    let mut in_exponent = false;
    value
        .chars()
        .map(|c| {
            if c == 'e' || c == 'E' {
                in_exponent = true;
            }
            if in_exponent || !c.is_ascii_digit() {
                return c;
            }
            let first = !seen_digit;
            seen_digit = true;
            if first && c != '0' {
                pick(NONZERO_DIGITS, rng)
            } else {
                pick(DIGITS, rng)
            }
        })
        .collect()
}

/// Strategy for `bigint`/`tinyint`/`int`/`long` and `float`.
///
/// Well-formed numeric literals keep their structure. Anything else is run
/// through the character-class scrambler so no letter or symbol of the
/// original survives.
#[derive(Debug, Clone)]
pub struct NumericStrategy {
    class: TypeClass,
}

impl NumericStrategy {
    pub fn integer() -> Self {
        Self {
            class: TypeClass::Integer,
        }
    }

    pub fn float() -> Self {
        Self {
            class: TypeClass::Float,
        }
    }

    fn is_literal(&self, value: &str) -> bool {
        match self.class {
            TypeClass::Float => FLOAT_RE.is_match(value),
            _ => INTEGER_RE.is_match(value),
        }
    }
}

impl Strategy for NumericStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        if self.is_literal(value) {
            Ok(scramble_digits(value, rng))
        } else {
            Ok(scramble_str(value, rng))
        }
    }

    fn class(&self) -> TypeClass {
        self.class
    }
}
