//! Hex string randomization.

use super::scramble::{pick, scramble_with, ScrambleOptions};
use super::{Strategy, TypeClass, ValueError};
use rand::RngCore;

const HEX_LOWER: &[u8] = b"0123456789abcdef";
const HEX_UPPER: &[u8] = b"0123456789ABCDEF";

/// Replace every character with a random hex digit.
///
/// Upper-case input letters get upper-case hex letters. Separators
/// (`:`, `-`, `.`, whitespace) and a leading `0x` prefix are kept so the
/// layout of the value survives; nothing else of the original does.
#[derive(Debug, Clone, Default)]
pub struct HexStringStrategy {
    options: ScrambleOptions,
}

impl HexStringStrategy {
    pub fn new(options: ScrambleOptions) -> Self {
        Self { options }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ':' | '-' | '.') || c.is_whitespace()
}

fn scramble_hex_char(c: char, rng: &mut dyn RngCore) -> char {
    if is_separator(c) {
        c
    } else if c.is_ascii_uppercase() {
        pick(HEX_UPPER, rng)
    } else {
        pick(HEX_LOWER, rng)
    }
}

impl Strategy for HexStringStrategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        let (prefix, body) = match value.get(..2) {
            Some(p) if p == "0x" || p == "0X" => value.split_at(2),
            _ => ("", value),
        };
        let scrambled = scramble_with(body, self.options, HEX_LOWER, rng, scramble_hex_char);
        Ok(format!("{}{}", prefix, scrambled))
    }

    fn class(&self) -> TypeClass {
        TypeClass::HexString
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_hex_digits_only() {
        let strategy = HexStringStrategy::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let input = "deadbeef0123";
        let output = strategy.apply(input, &mut rng).unwrap();
        assert_eq!(output.len(), input.len());
        assert!(output
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_case_and_separators_kept() {
        let strategy = HexStringStrategy::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let output = strategy.apply("0xAB:CD", &mut rng).unwrap();
        assert_eq!(output.len(), 7);
        assert_eq!(&output[..2], "0x");
        assert_eq!(&output[4..5], ":");
        for i in [2, 3, 5, 6] {
            let c = output.as_bytes()[i] as char;
            assert!(c.is_ascii_digit() || ('A'..='F').contains(&c), "{c}");
        }
    }

    #[test]
    fn test_padding_uses_hex_alphabet() {
        let strategy = HexStringStrategy::new(ScrambleOptions {
            padding_before: 4,
            padding_after: 4,
        });
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let output = strategy.apply("ff", &mut rng).unwrap();
        assert_eq!(output.len(), 10);
        assert!(output.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_non_hex_letters_replaced() {
        let strategy = HexStringStrategy::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let input = "deadbeef-secret-GHIJK";

        for _ in 0..20 {
            let output = strategy.apply(input, &mut rng).unwrap();
            assert_eq!(output.len(), input.len());
            assert_eq!(&output[8..9], "-");
            assert_eq!(&output[15..16], "-");
            assert!(output[..15]
                .chars()
                .all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
            assert!(output[16..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)), "{output}");
            // s, r, t, G..K are not hex digits and can never come back
            for (a, b) in input.chars().zip(output.chars()) {
                if !a.is_ascii_hexdigit() && a != '-' {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
