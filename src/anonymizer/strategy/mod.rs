//! Shape-preserving randomization strategies.
//!
//! Each declared column type maps to a [`TypeClass`], and each type class to
//! one [`Strategy`]:
//! - `uuid`: fresh UUID carrying a recognizable `fake` prefix
//! - `ip_address` / `ip_address_v4`: random dotted quad with the same octet count
//! - `ip_address_v6`: left unchanged
//! - `hostname`: RFC 1123 alphabet, `.` and `-` kept
//! - `hexstring`: random hex digits
//! - `varchar` / `text` / `mediumtext` and unknown types: character-class scrambling
//! - `bigint` / `tinyint` / `int` / `long`, `float`: digit scrambling
//! - `datetime`: random well-formed timestamp
//! - `json`: values scrambled, keys kept
//! - `pathname`: path separators and dots kept

mod datetime;
mod fake_uuid;
mod hex;
mod hostname;
mod ip;
mod json;
mod numeric;
mod pathname;
mod scramble;

pub use datetime::DateTimeStrategy;
pub use fake_uuid::UuidStrategy;
pub use hex::HexStringStrategy;
pub use hostname::HostnameStrategy;
pub use ip::{IpV4Strategy, IpV6Strategy};
pub use json::JsonStrategy;
pub use numeric::NumericStrategy;
pub use pathname::PathnameStrategy;
pub use scramble::{scramble_char, scramble_str, ScrambleOptions, ScrambleStrategy};

use crate::parser::{escape_mysql, unescape_mysql};
use crate::schema::bare_type_name;
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Coarse randomization category derived from a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Uuid,
    IpAddressV4,
    IpAddressV6,
    Hostname,
    HexString,
    /// varchar, text, mediumtext
    Text,
    /// bigint, tinyint, int, long
    Integer,
    Float,
    DateTime,
    Json,
    Pathname,
    /// Anything without a dedicated handler
    Default,
}

impl TypeClass {
    /// Map a declared type (size suffix allowed) to its class. Unknown names
    /// fall back to [`TypeClass::Default`].
    pub fn from_type_name(declared: &str) -> Self {
        Self::recognize(declared).unwrap_or(TypeClass::Default)
    }

    /// Map a declared type to its class, or `None` when the name has no
    /// dedicated handler
    pub fn recognize(declared: &str) -> Option<Self> {
        let base = bare_type_name(declared).to_ascii_lowercase();
        let class = match base.as_str() {
            "uuid" => TypeClass::Uuid,
            "ip_address" | "ip_address_v4" => TypeClass::IpAddressV4,
            "ip_address_v6" => TypeClass::IpAddressV6,
            "hostname" => TypeClass::Hostname,
            "hexstring" => TypeClass::HexString,
            "varchar" | "text" | "mediumtext" => TypeClass::Text,
            "bigint" | "tinyint" | "int" | "long" => TypeClass::Integer,
            "float" => TypeClass::Float,
            "datetime" => TypeClass::DateTime,
            "json" => TypeClass::Json,
            "pathname" => TypeClass::Pathname,
            "default" => TypeClass::Default,
            _ => return None,
        };
        Some(class)
    }

    /// Classes whose output is always a string literal in SQL
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            TypeClass::Uuid
                | TypeClass::IpAddressV4
                | TypeClass::Hostname
                | TypeClass::DateTime
                | TypeClass::Json
                | TypeClass::Pathname
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeClass::Uuid => "uuid",
            TypeClass::IpAddressV4 => "ip_address_v4",
            TypeClass::IpAddressV6 => "ip_address_v6",
            TypeClass::Hostname => "hostname",
            TypeClass::HexString => "hexstring",
            TypeClass::Text => "text",
            TypeClass::Integer => "integer",
            TypeClass::Float => "float",
            TypeClass::DateTime => "datetime",
            TypeClass::Json => "json",
            TypeClass::Pathname => "pathname",
            TypeClass::Default => "default",
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value the strategy for its class cannot handle
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ValueError {
    pub class: TypeClass,
    pub reason: String,
}

impl ValueError {
    pub fn new(class: TypeClass, reason: impl Into<String>) -> Self {
        Self {
            class,
            reason: reason.into(),
        }
    }
}

/// Trait for randomization strategies.
///
/// `apply` receives the unquoted, unescaped value and returns its
/// replacement in the same form.
pub trait Strategy: Send + Sync {
    fn apply(&self, value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError>;

    /// The class this strategy is registered under
    fn class(&self) -> TypeClass;
}

/// Lookup table from type class to strategy
pub struct StrategyRegistry {
    handlers: AHashMap<TypeClass, Box<dyn Strategy>>,
    fallback: ScrambleStrategy,
}

impl StrategyRegistry {
    /// An empty registry; every class falls back to generic scrambling
    pub fn empty() -> Self {
        Self {
            handlers: AHashMap::new(),
            fallback: ScrambleStrategy::new(TypeClass::Default),
        }
    }

    /// Register a strategy under its own class, replacing any previous one
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.handlers.insert(strategy.class(), strategy);
    }

    /// Strategy for a class, or the generic scrambler
    pub fn get(&self, class: TypeClass) -> &dyn Strategy {
        match self.handlers.get(&class) {
            Some(handler) => handler.as_ref(),
            None => &self.fallback,
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(UuidStrategy::new()));
        registry.register(Box::new(IpV4Strategy));
        registry.register(Box::new(IpV6Strategy));
        registry.register(Box::new(HostnameStrategy));
        registry.register(Box::new(HexStringStrategy::default()));
        registry.register(Box::new(ScrambleStrategy::new(TypeClass::Text)));
        registry.register(Box::new(NumericStrategy::integer()));
        registry.register(Box::new(NumericStrategy::float()));
        registry.register(Box::new(DateTimeStrategy::default()));
        registry.register(Box::new(JsonStrategy));
        registry.register(Box::new(PathnameStrategy));
        registry.register(Box::new(ScrambleStrategy::new(TypeClass::Default)));
        registry
    }
}

/// Randomization engine: SQL literal handling around the strategy registry
pub struct Randomizer {
    registry: StrategyRegistry,
    rng: StdRng,
}

impl Randomizer {
    /// Create a randomizer, seeded for reproducible output when `seed` is set
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            registry: StrategyRegistry::default(),
            rng,
        }
    }

    /// Replace the strategy registry
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Randomize a raw SQL value according to its declared type
    pub fn randomize(
        &mut self,
        old_value: &str,
        declared_type: &str,
    ) -> Result<String, ValueError> {
        self.randomize_as(old_value, TypeClass::from_type_name(declared_type))
    }

    /// Randomize a raw SQL value with an explicit type class.
    ///
    /// `NULL` and blank values are returned unchanged. Single-quoted values
    /// are unescaped before the strategy runs and re-quoted afterwards.
    pub fn randomize_as(
        &mut self,
        old_value: &str,
        class: TypeClass,
    ) -> Result<String, ValueError> {
        if old_value.eq_ignore_ascii_case("NULL") || old_value.trim().is_empty() {
            return Ok(old_value.to_string());
        }

        let quoted =
            old_value.len() >= 2 && old_value.starts_with('\'') && old_value.ends_with('\'');
        let inner = if quoted {
            unescape_mysql(&old_value[1..old_value.len() - 1])
        } else {
            old_value.to_string()
        };

        if inner.trim().is_empty() {
            return Ok(old_value.to_string());
        }

        let class = if class == TypeClass::Default && inner.starts_with('{') {
            TypeClass::Json
        } else {
            class
        };

        let replaced = self.registry.get(class).apply(&inner, &mut self.rng)?;
        trace!(%class, "value randomized");

        if quoted || class.is_textual() {
            Ok(format!("'{}'", escape_mysql(&replaced)))
        } else {
            Ok(replaced)
        }
    }
}
