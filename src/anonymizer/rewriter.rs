//! Row rewriter for INSERT statements.
//!
//! Splits the tuple list of an `INSERT INTO ... VALUES (...),(...);` line
//! into rows and fields, randomizes the configured columns, and rebuilds the
//! line either in place or in the expanded one-row-per-line layout.

use crate::anonymizer::config::{ColumnRule, InsertLayout};
use crate::anonymizer::strategy::{Randomizer, StrategyRegistry, TypeClass};
use crate::error::{AnonymizeError, Result};
use crate::parser::{split_rows, FieldSplitter, RowSplitMode};
use crate::schema::TableSchema;
use tracing::{trace, warn};

/// A configured column resolved against the captured schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// 0-based field index within a row
    pub index: usize,
    pub column: String,
    pub declared_type: String,
    pub class: TypeClass,
}

/// Everything needed to rewrite INSERT rows for one table
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub table: String,
    /// Number of fields every row must have
    pub field_count: usize,
    /// Columns to randomize, in field order
    pub columns: Vec<ColumnPlan>,
}

impl TablePlan {
    /// Resolve the configured columns of a table against its schema.
    ///
    /// A configured type that disagrees with the schema is fatal. A
    /// configured column that the schema does not have is skipped with a
    /// warning, or fatal when `strict` is set.
    pub fn resolve(schema: &TableSchema, rules: &[ColumnRule], strict: bool) -> Result<Self> {
        let mut columns = Vec::with_capacity(rules.len());

        for rule in rules {
            let Some(column) = schema.get_column(&rule.column) else {
                if strict {
                    return Err(AnonymizeError::UnknownColumn {
                        table: schema.name.clone(),
                        column: rule.column.clone(),
                    });
                }
                warn!(
                    table = %schema.name,
                    column = %rule.column,
                    "configured column not found in schema; skipping"
                );
                continue;
            };

            if !rule.matches_type(&column.declared_type) {
                return Err(AnonymizeError::ConfigSchemaMismatch {
                    table: schema.name.clone(),
                    column: column.name.clone(),
                    expected: rule.declared_type.clone(),
                    found: column.declared_type.clone(),
                });
            }

            columns.push(ColumnPlan {
                index: column.index(),
                column: column.name.clone(),
                declared_type: column.declared_type.clone(),
                class: rule.type_class()?,
            });
        }

        columns.sort_by_key(|c| c.index);

        Ok(Self {
            table: schema.name.clone(),
            field_count: schema.len(),
            columns,
        })
    }

    /// The plan for a configured column, if it is anonymized
    pub fn column(&self, index: usize) -> Option<&ColumnPlan> {
        self.columns.iter().find(|c| c.index == index)
    }
}

/// Result of rewriting one INSERT line
#[derive(Debug, Clone)]
pub struct RewrittenInsert {
    /// The new line, without a line terminator
    pub line: String,
    pub rows: u64,
    /// Values that were actually replaced (NULL and blank values are not)
    pub values: u64,
}

/// Rewriter for the rows of INSERT statements
pub struct RowAnonymizer {
    randomizer: Randomizer,
    splitter: FieldSplitter,
    row_split: RowSplitMode,
    layout: InsertLayout,
}

impl RowAnonymizer {
    /// Create a rewriter with optional seed for reproducibility
    pub fn new(seed: Option<u64>, row_split: RowSplitMode, layout: InsertLayout) -> Self {
        Self {
            randomizer: Randomizer::new(seed),
            splitter: FieldSplitter::default(),
            row_split,
            layout,
        }
    }

    /// Replace the randomization strategies
    pub fn with_strategies(mut self, registry: StrategyRegistry) -> Self {
        self.randomizer = self.randomizer.with_registry(registry);
        self
    }

    /// Rewrite an INSERT line whose tuple list occupies
    /// `line[values_start..values_end]`
    pub fn rewrite_insert(
        &mut self,
        line: &str,
        values_start: usize,
        values_end: usize,
        plan: &TablePlan,
        line_no: u64,
    ) -> Result<RewrittenInsert> {
        let values = &line[values_start..values_end];
        let rows = split_rows(values, self.row_split)
            .map_err(|reason| AnonymizeError::malformed(&plan.table, line_no, reason))?;

        // (start, end, replacement) relative to `values`
        let mut replacements: Vec<(usize, usize, String)> = Vec::new();
        let mut expanded_rows: Vec<String> = Vec::with_capacity(rows.len());
        let mut replaced = 0u64;

        for (row_idx, row) in rows.iter().enumerate() {
            let row_text = row.slice(values);
            let spans = self.splitter.split_spans(row_text);

            if spans.len() != plan.field_count {
                return Err(AnonymizeError::malformed(
                    &plan.table,
                    line_no,
                    format!(
                        "row {} has {} fields, schema has {} columns",
                        row_idx + 1,
                        spans.len(),
                        plan.field_count
                    ),
                ));
            }

            let mut fields: Vec<String> = Vec::with_capacity(spans.len());
            for (index, span) in spans.iter().enumerate() {
                let raw = span.slice(row_text);
                let old = raw.trim_end();

                let new = match plan.column(index) {
                    Some(column) => {
                        let new = self.randomizer.randomize_as(old, column.class).map_err(
                            |e| {
                                AnonymizeError::unparseable(
                                    &plan.table,
                                    &column.column,
                                    line_no,
                                    e.class.as_str(),
                                    e.reason,
                                )
                            },
                        )?;
                        if new != old {
                            replaced += 1;
                            replacements.push((
                                row.start + span.start,
                                row.start + span.start + old.len(),
                                new.clone(),
                            ));
                        }
                        new
                    }
                    None => old.to_string(),
                };

                if self.layout == InsertLayout::Expanded {
                    fields.push(new);
                }
            }

            if self.layout == InsertLayout::Expanded {
                expanded_rows.push(fields.join(","));
            }
        }

        trace!(
            table = %plan.table,
            rows = rows.len(),
            values = replaced,
            "INSERT rewritten"
        );

        let line = match self.layout {
            InsertLayout::Preserve => {
                let mut out = String::with_capacity(line.len() + 16);
                out.push_str(&line[..values_start]);
                let mut cursor = 0;
                for (start, end, replacement) in &replacements {
                    out.push_str(&values[cursor..*start]);
                    out.push_str(replacement);
                    cursor = *end;
                }
                out.push_str(&values[cursor..]);
                out.push_str(&line[values_end..]);
                out
            }
            InsertLayout::Expanded => format!(
                "{}\n    ({}){}",
                line[..values_start].trim_end(),
                expanded_rows.join("),\n    ("),
                &line[values_end..]
            ),
        };

        Ok(RewrittenInsert {
            line,
            rows: rows.len() as u64,
            values: replaced,
        })
    }
}
