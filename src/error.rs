//! Error types for the anonymization pass.

use thiserror::Error;

/// Errors raised while anonymizing a dump.
///
/// Everything except [`AnonymizeError::Io`] is fatal for the run: a dump that
/// cannot be anonymized correctly is never written out partially.
#[derive(Debug, Error)]
pub enum AnonymizeError {
    /// The configured type for a column disagrees with the parsed schema
    #[error(
        "configuration/schema mismatch for `{table}`.`{column}`: configured as '{expected}', schema declares '{found}'"
    )]
    ConfigSchemaMismatch {
        table: String,
        column: String,
        expected: String,
        found: String,
    },

    /// An INSERT row could not be split into the expected number of fields
    #[error("malformed INSERT for `{table}` at line {line}: {reason}")]
    MalformedInsert {
        table: String,
        line: u64,
        reason: String,
    },

    /// A value could not be randomized for its type. The value itself is
    /// not carried so that it never reaches logs.
    #[error("cannot anonymize `{table}`.`{column}` at line {line} as {type_name}: {reason}")]
    UnparseableValue {
        table: String,
        column: String,
        line: u64,
        type_name: String,
        reason: String,
    },

    /// A configured table had an INSERT before any CREATE TABLE
    #[error("no schema captured for configured table `{table}` (INSERT at line {line} precedes its CREATE TABLE)")]
    MissingSchema { table: String, line: u64 },

    /// A configured column does not exist in the table (strict mode only)
    #[error("configured column `{table}`.`{column}` not found in schema")]
    UnknownColumn { table: String, column: String },

    /// Invalid anonymization configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl AnonymizeError {
    pub(crate) fn unparseable(
        table: &str,
        column: &str,
        line: u64,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AnonymizeError::UnparseableValue {
            table: table.to_string(),
            column: column.to_string(),
            line,
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Attach the table and line to a row-level failure
    pub(crate) fn malformed(table: &str, line: u64, reason: impl Into<String>) -> Self {
        AnonymizeError::MalformedInsert {
            table: table.to_string(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnonymizeError>;
