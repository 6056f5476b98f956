//! Single-pass dump processor.
//!
//! Drives the line classifier over a dump, captures table schemas as they
//! stream past, and hands INSERT lines for configured tables to the row
//! rewriter. Every other line is written through unchanged.

use crate::anonymizer::config::{AnonymizationSpec, ProcessOptions};
use crate::anonymizer::rewriter::{RowAnonymizer, TablePlan};
use crate::anonymizer::strategy::StrategyRegistry;
use crate::anonymizer::{AnonymizeStats, TableAnonymizeStats, TypeCount};
use crate::error::{AnonymizeError, Result};
use crate::parser::{classify_line, split_line_ending, LineKind};
use crate::schema::{SchemaRegistry, TableSchema};
use ahash::AHashMap;
use std::io::{BufRead, Write};
use tracing::debug;

/// One pass over one dump. Owns the schema registry for that pass.
pub struct DumpProcessor {
    spec: AnonymizationSpec,
    options: ProcessOptions,
    registry: SchemaRegistry,
    plans: AHashMap<String, TablePlan>,
    rows: RowAnonymizer,
    line_no: u64,
    stats: AnonymizeStats,
    table_stats: AHashMap<String, TableAnonymizeStats>,
}

impl DumpProcessor {
    pub fn new(spec: AnonymizationSpec, options: ProcessOptions) -> Self {
        let rows = RowAnonymizer::new(options.seed, options.row_split, options.layout);
        Self {
            spec,
            options,
            registry: SchemaRegistry::new(),
            plans: AHashMap::new(),
            rows,
            line_no: 0,
            stats: AnonymizeStats::default(),
            table_stats: AHashMap::new(),
        }
    }

    /// Replace the randomization strategies
    pub fn with_strategies(mut self, registry: StrategyRegistry) -> Self {
        self.rows = self.rows.with_strategies(registry);
        self
    }

    /// Schemas captured so far
    pub fn schema(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Finish the pass and keep only the captured schemas
    pub fn into_schema(self) -> SchemaRegistry {
        self.registry
    }

    /// Process every line of `reader`, writing the result to `out`
    pub fn process_stream<R: BufRead, W: Write>(
        &mut self,
        mut reader: R,
        out: &mut W,
    ) -> Result<()> {
        let mut buf = Vec::with_capacity(64 * 1024);
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.process_bytes(&buf, out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Process one raw line that may not be valid UTF-8.
    ///
    /// Lines that are not UTF-8 are written through unchanged unless they
    /// are INSERTs for a configured table, which cannot be anonymized
    /// safely.
    pub fn process_bytes<W: Write>(&mut self, raw: &[u8], out: &mut W) -> Result<()> {
        match std::str::from_utf8(raw) {
            Ok(line) => self.process_line(line, out),
            Err(_) => {
                self.line_no += 1;
                self.stats.lines += 1;
                let lossy = String::from_utf8_lossy(raw);
                let (content, _) = split_line_ending(&lossy);
                let table = match classify_line(content, self.registry.in_table_def()) {
                    LineKind::Insert { table, .. } | LineKind::UnsupportedInsert { table } => {
                        Some(table)
                    }
                    _ => None,
                };
                if let Some(table) = table.filter(|t| self.spec.is_configured(t)) {
                    return Err(AnonymizeError::malformed(
                        table,
                        self.line_no,
                        "INSERT is not valid UTF-8",
                    ));
                }
                debug!(line = self.line_no, "non-UTF-8 line passed through");
                out.write_all(raw)?;
                Ok(())
            }
        }
    }

    /// Process one line, including its terminator if it has one
    pub fn process_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        self.line_no += 1;
        self.stats.lines += 1;
        let (content, ending) = split_line_ending(line);

        match classify_line(content, self.registry.in_table_def()) {
            LineKind::Ignorable | LineKind::TableConstraint | LineKind::Other => {
                out.write_all(line.as_bytes())?;
            }
            LineKind::CreateTable { table } => {
                self.registry.begin_table(table);
                self.plans.remove(table);
                out.write_all(line.as_bytes())?;
            }
            LineKind::ColumnDef {
                name,
                declared_type,
            } => {
                self.registry.add_column(name, declared_type);
                out.write_all(line.as_bytes())?;
            }
            LineKind::EndTable { .. } => {
                out.write_all(line.as_bytes())?;
                if let Some(table) = self.registry.end_table() {
                    let table = table.name.clone();
                    self.stats.tables += 1;
                    self.prepare_plan(&table)?;
                    if self.options.comments {
                        self.write_comments(&table, ending, out)?;
                    }
                }
            }
            LineKind::Insert {
                table,
                values_start,
                values_end,
            } => {
                if !self.spec.is_configured(table) {
                    self.stats.inserts_passed_through += 1;
                    out.write_all(line.as_bytes())?;
                    return Ok(());
                }

                if !self.plans.contains_key(table) {
                    if self.registry.lookup(table).is_none() {
                        return Err(AnonymizeError::MissingSchema {
                            table: table.to_string(),
                            line: self.line_no,
                        });
                    }
                    self.prepare_plan(table)?;
                }
                let Some(plan) = self.plans.get(table) else {
                    return Err(AnonymizeError::MissingSchema {
                        table: table.to_string(),
                        line: self.line_no,
                    });
                };

                debug!(">>> {}", content);
                let rewritten = self.rows.rewrite_insert(
                    content,
                    values_start,
                    values_end,
                    plan,
                    self.line_no,
                )?;
                debug!("<<< {}", rewritten.line);

                out.write_all(rewritten.line.as_bytes())?;
                out.write_all(ending.as_bytes())?;

                self.stats.inserts_rewritten += 1;
                self.stats.rows_anonymized += rewritten.rows;
                self.stats.values_anonymized += rewritten.values;
                let entry = self
                    .table_stats
                    .entry(table.to_string())
                    .or_insert_with(|| TableAnonymizeStats::new(table));
                entry.rows_anonymized += rewritten.rows;
                entry.values_anonymized += rewritten.values;
            }
            LineKind::UnsupportedInsert { table } => {
                if self.spec.is_configured(table) {
                    return Err(AnonymizeError::malformed(
                        table,
                        self.line_no,
                        "only single-line INSERT INTO `table` VALUES (...); statements can be anonymized",
                    ));
                }
                self.stats.inserts_passed_through += 1;
                out.write_all(line.as_bytes())?;
            }
        }

        Ok(())
    }

    /// Resolve and cache the plan for a configured table, so that schema
    /// disagreements surface before any of its rows are written
    fn prepare_plan(&mut self, table: &str) -> Result<()> {
        let Some(rules) = self.spec.rules_for(table) else {
            return Ok(());
        };
        let Some(schema) = self.registry.lookup(table) else {
            return Ok(());
        };

        let plan = TablePlan::resolve(schema, rules, self.options.strict)?;
        debug!(
            table = %table,
            columns = plan.columns.len(),
            "anonymization plan ready"
        );
        self.plans.insert(table.to_string(), plan);
        Ok(())
    }

    /// One `/* column N: `name` type[, anonymized as class] */` line per
    /// column, followed by a blank line
    fn write_comments<W: Write>(&self, table: &str, ending: &str, out: &mut W) -> Result<()> {
        let Some(schema) = self.registry.lookup(table) else {
            return Ok(());
        };
        let ending = if ending.is_empty() { "\n" } else { ending };
        let plan = self.plans.get(table);

        for line in describe_table(schema, plan) {
            out.write_all(line.as_bytes())?;
            out.write_all(ending.as_bytes())?;
        }
        out.write_all(ending.as_bytes())?;
        Ok(())
    }

    /// Finish the pass and collect statistics
    pub fn finish(mut self) -> AnonymizeStats {
        for table in self.registry.iter() {
            let mut entry = self
                .table_stats
                .remove(&table.name)
                .unwrap_or_else(|| TableAnonymizeStats::new(&table.name));
            entry.columns = table.len();
            entry.configured_columns = self
                .plans
                .get(&table.name)
                .map(|p| p.columns.len())
                .unwrap_or(0);
            self.stats.table_stats.push(entry);
        }
        self.stats.type_frequency = self
            .registry
            .type_frequency()
            .into_iter()
            .map(|(declared_type, count)| TypeCount {
                declared_type,
                count,
            })
            .collect();
        self.stats
    }
}

/// Descriptive comment lines for a sealed table
pub fn describe_table(schema: &TableSchema, plan: Option<&TablePlan>) -> Vec<String> {
    schema
        .columns
        .iter()
        .map(|column| {
            match plan.and_then(|p| p.column(column.index())) {
                Some(configured) => format!(
                    "/* column {}: `{}` {}, anonymized as {} */",
                    column.position, column.name, column.declared_type, configured.class
                ),
                None => format!(
                    "/* column {}: `{}` {} */",
                    column.position, column.name, column.declared_type
                ),
            }
        })
        .collect()
}
