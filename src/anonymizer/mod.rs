//! Anonymizer module for rewriting sensitive values in MySQL dumps.
//!
//! This module provides:
//! - YAML configuration of which table columns to anonymize, and as what
//! - Shape-preserving randomization strategies per column type
//! - A single-pass processor that captures schemas and rewrites INSERT rows
//! - Config skeleton generation from a dump's schema

pub mod config;
mod config_generator;
pub mod processor;
pub mod rewriter;
pub mod strategy;

pub use config::{
    AnonymizationSpec, AnonymizeConfig, AnonymizeConfigBuilder, AnonymizeYamlConfig, ColumnRule,
    InsertLayout, ProcessOptions,
};
pub use config_generator::{analyze_columns, generate_config, render_config, ColumnSuggestion};
pub use processor::DumpProcessor;
pub use rewriter::{RowAnonymizer, TablePlan};
pub use strategy::{Randomizer, Strategy, StrategyRegistry, TypeClass};

use crate::compression::Compression;
use crate::error::Result;
use crate::progress::ProgressReader;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Statistics from an anonymization pass
#[derive(Debug, Default, Serialize)]
pub struct AnonymizeStats {
    /// Lines read
    pub lines: u64,
    /// Table definitions captured
    pub tables: usize,
    /// INSERT lines rewritten
    pub inserts_rewritten: u64,
    /// INSERT lines for unconfigured tables, written unchanged
    pub inserts_passed_through: u64,
    pub rows_anonymized: u64,
    pub values_anonymized: u64,
    /// Compressed input size in bytes
    pub bytes_read: u64,
    /// Per-table statistics, in definition order
    pub table_stats: Vec<TableAnonymizeStats>,
    /// Declared column types, most frequent first
    pub type_frequency: Vec<TypeCount>,
    /// Where output was written (None on a dry run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Per-table anonymization statistics
#[derive(Debug, Clone, Serialize)]
pub struct TableAnonymizeStats {
    pub name: String,
    pub columns: usize,
    pub configured_columns: usize,
    pub rows_anonymized: u64,
    pub values_anonymized: u64,
}

impl TableAnonymizeStats {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: 0,
            configured_columns: 0,
            rows_anonymized: 0,
            values_anonymized: 0,
        }
    }
}

/// How often a declared type appeared across all tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub declared_type: String,
    pub count: u64,
}

/// Main anonymizer: one file in, one file out
pub struct Anonymizer {
    config: AnonymizeConfig,
    strategies: Option<StrategyRegistry>,
    progress_fn: Option<Box<dyn Fn(u64)>>,
}

impl Anonymizer {
    pub fn new(config: AnonymizeConfig) -> Self {
        Self {
            config,
            strategies: None,
            progress_fn: None,
        }
    }

    /// Replace the randomization strategies
    pub fn with_strategies(mut self, registry: StrategyRegistry) -> Self {
        self.strategies = Some(registry);
        self
    }

    /// Report compressed bytes read so far
    pub fn with_progress<F: Fn(u64) + 'static>(mut self, f: F) -> Self {
        self.progress_fn = Some(Box::new(f));
        self
    }

    /// Run the pass.
    ///
    /// Output goes to a temporary file next to the destination and is
    /// renamed into place only when the whole dump was processed, so a
    /// failed run never leaves partial output behind.
    pub fn run(mut self) -> Result<AnonymizeStats> {
        self.config.validate()?;

        let file = File::open(&self.config.input)?;
        let file_size = file.metadata()?.len();
        let compression = Compression::from_path(&self.config.input);
        if compression != Compression::None {
            debug!(%compression, "decompressing input");
        }

        let reader: Box<dyn Read> = match self.progress_fn.take() {
            Some(cb) => compression.wrap_reader(Box::new(ProgressReader::new(file, cb)))?,
            None => compression.wrap_reader(Box::new(file))?,
        };
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);

        let mut processor =
            DumpProcessor::new(self.config.spec.clone(), self.config.options.clone());
        if let Some(registry) = self.strategies.take() {
            processor = processor.with_strategies(registry);
        }

        if self.config.dry_run {
            processor.process_stream(reader, &mut io::sink())?;
            let mut stats = processor.finish();
            stats.bytes_read = file_size;
            return Ok(stats);
        }

        let output = self.config.output_path();
        let partial = partial_path(&output);
        let result = write_output(&mut processor, reader, &partial);
        if let Err(e) = result {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, &output)?;
        info!(output = %output.display(), "anonymized dump written");

        let mut stats = processor.finish();
        stats.bytes_read = file_size;
        stats.output = Some(output);
        Ok(stats)
    }
}

fn write_output<R: io::BufRead>(
    processor: &mut DumpProcessor,
    reader: R,
    path: &Path,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    processor.process_stream(reader, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Temporary sibling of the final output path
fn partial_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/a.sql.output")),
            PathBuf::from("/tmp/a.sql.output.partial")
        );
    }

    #[test]
    fn test_stats_serialize() {
        let stats = AnonymizeStats {
            tables: 1,
            table_stats: vec![TableAnonymizeStats::new("t")],
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["tables"], 1);
        assert_eq!(json["table_stats"][0]["name"], "t");
        assert!(json.get("output").is_none());
    }
}
