//! UUID replacement with a recognizable fake prefix.

use super::{Strategy, TypeClass, ValueError};
use rand::RngCore;
use uuid::Builder;

/// Literal that replaces the first characters of every generated UUID
pub const FAKE_UUID_PREFIX: &str = "fake";

/// Generate a fresh random UUID whose first four characters are replaced by
/// [`FAKE_UUID_PREFIX`]. The result keeps the 8-4-4-4-12 layout and can never
/// collide with a real UUID.
#[derive(Debug, Clone)]
pub struct UuidStrategy {
    prefix: String,
}

impl UuidStrategy {
    pub fn new() -> Self {
        Self {
            prefix: FAKE_UUID_PREFIX.to_string(),
        }
    }
}

impl Default for UuidStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for UuidStrategy {
    fn apply(&self, _value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let generated = Builder::from_random_bytes(bytes).into_uuid().to_string();

        let keep = self.prefix.len().min(8);
        Ok(format!("{}{}", &self.prefix[..keep], &generated[keep..]))
    }

    fn class(&self) -> TypeClass {
        TypeClass::Uuid
    }
}
