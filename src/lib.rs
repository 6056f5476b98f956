// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod anonymizer;
pub mod compression;
pub mod error;
pub mod parser;
pub mod progress;
pub mod schema;

pub use anonymizer::{AnonymizeConfig, AnonymizeStats, Anonymizer};
pub use error::{AnonymizeError, Result};
