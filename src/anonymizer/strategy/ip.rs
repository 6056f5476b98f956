//! IP address randomization.

use super::{Strategy, TypeClass, ValueError};
use rand::{Rng, RngCore};

/// Replace an IPv4 address (or its 2/3-octet shorthand such as `127.1`)
/// with random octets in `1..=254`, keeping the octet count.
#[derive(Debug, Clone, Default)]
pub struct IpV4Strategy;

impl Strategy for IpV4Strategy {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        let octets = value.split('.').count();
        if !(2..=4).contains(&octets) {
            return Err(ValueError::new(
                TypeClass::IpAddressV4,
                format!("not an IPv4 address: {} dot-separated parts", octets),
            ));
        }

        let parts: Vec<String> = (0..octets)
            .map(|_| rng.random_range(1..=254u8).to_string())
            .collect();
        Ok(parts.join("."))
    }

    fn class(&self) -> TypeClass {
        TypeClass::IpAddressV4
    }
}

/// IPv6 addresses are recognised but left as they are
#[derive(Debug, Clone, Default)]
pub struct IpV6Strategy;

impl Strategy for IpV6Strategy {
    fn apply(&self, value: &str, _rng: &mut dyn RngCore) -> Result<String, ValueError> {
        Ok(value.to_string())
    }

    fn class(&self) -> TypeClass {
        TypeClass::IpAddressV6
    }
}
