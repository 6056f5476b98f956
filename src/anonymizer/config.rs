//! Configuration types for the anonymizer.

use crate::anonymizer::strategy::TypeClass;
use crate::compression::Compression;
use crate::error::{AnonymizeError, Result};
use crate::parser::RowSplitMode;
use crate::schema::bare_type_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One configured column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    /// Column name as declared in the table
    pub column: String,
    /// Expected declared SQL type, checked against the captured schema
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Randomization class to use instead of the one implied by the SQL type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymize_as: Option<String>,
}

impl ColumnRule {
    pub fn new(column: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            declared_type: declared_type.into(),
            anonymize_as: None,
        }
    }

    pub fn anonymize_as(mut self, class: impl Into<String>) -> Self {
        self.anonymize_as = Some(class.into());
        self
    }

    /// Randomization class for this column
    pub fn type_class(&self) -> Result<TypeClass> {
        match &self.anonymize_as {
            Some(name) => TypeClass::recognize(name).ok_or_else(|| {
                AnonymizeError::Config(format!(
                    "column `{}`: unknown anonymize_as type '{}'",
                    self.column, name
                ))
            }),
            None => Ok(TypeClass::from_type_name(&self.declared_type)),
        }
    }

    /// Whether the schema's declared type agrees with the configured one.
    ///
    /// Comparison ignores case. A configured type without a size suffix only
    /// has to match the schema's bare type name.
    pub fn matches_type(&self, schema_type: &str) -> bool {
        let configured = self.declared_type.trim();
        if configured.contains('(') {
            configured.eq_ignore_ascii_case(schema_type.trim())
        } else {
            bare_type_name(configured).eq_ignore_ascii_case(bare_type_name(schema_type))
        }
    }

    fn validate(&self, table: &str) -> Result<()> {
        if self.column.trim().is_empty() {
            return Err(AnonymizeError::Config(format!(
                "table `{}`: column name cannot be empty",
                table
            )));
        }
        if self.declared_type.trim().is_empty() {
            return Err(AnonymizeError::Config(format!(
                "column `{}`.`{}`: type cannot be empty",
                table, self.column
            )));
        }
        self.type_class().map(|_| ())
    }
}

/// Which columns of which tables get anonymized, and at what type.
///
/// Read-only for the duration of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymizationSpec {
    tables: BTreeMap<String, Vec<ColumnRule>>,
}

impl AnonymizationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column rule for a table
    pub fn add_column(&mut self, table: impl Into<String>, rule: ColumnRule) -> &mut Self {
        self.tables.entry(table.into()).or_default().push(rule);
        self
    }

    /// Configured columns for a table, in declaration order
    pub fn rules_for(&self, table: &str) -> Option<&[ColumnRule]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn is_configured(&self, table: &str) -> bool {
        self.tables.get(table).is_some_and(|rules| !rules.is_empty())
    }

    /// Configured table names, sorted
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check every rule: names and types present, `anonymize_as` known, no
    /// column configured twice for one table
    pub fn validate(&self) -> Result<()> {
        for (table, rules) in &self.tables {
            if table.trim().is_empty() {
                return Err(AnonymizeError::Config(
                    "table name cannot be empty".to_string(),
                ));
            }
            for (i, rule) in rules.iter().enumerate() {
                rule.validate(table)?;
                if rules[..i]
                    .iter()
                    .any(|r| r.column.eq_ignore_ascii_case(&rule.column))
                {
                    return Err(AnonymizeError::Config(format!(
                        "column `{}`.`{}` configured more than once",
                        table, rule.column
                    )));
                }
            }
        }
        Ok(())
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymizeYamlConfig {
    /// Random seed for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Table name to configured columns
    #[serde(default)]
    pub tables: AnonymizationSpec,
}

impl AnonymizeYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// How rewritten INSERT statements are laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertLayout {
    /// Substitute values in place; everything else stays byte-identical
    #[default]
    Preserve,
    /// One row per line, indented under `VALUES`
    Expanded,
}

/// Options for one pass over a dump
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Append descriptive comments after each table definition
    pub comments: bool,
    pub layout: InsertLayout,
    /// Treat configured columns missing from the schema as errors
    pub strict: bool,
    pub row_split: RowSplitMode,
    /// Random seed for reproducible output
    pub seed: Option<u64>,
}

/// Runtime configuration for anonymization
#[derive(Debug)]
pub struct AnonymizeConfig {
    /// Input dump file
    pub input: PathBuf,
    /// Output file (None for `<input>.output`)
    pub output: Option<PathBuf>,
    /// Columns to anonymize
    pub spec: AnonymizationSpec,
    pub options: ProcessOptions,
    /// Show progress
    pub progress: bool,
    /// Process the dump without writing output
    pub dry_run: bool,
}

impl AnonymizeConfig {
    /// Create a new builder
    pub fn builder() -> AnonymizeConfigBuilder {
        AnonymizeConfigBuilder::default()
    }

    /// Where output is written: the explicit path, or `<input>.output`
    /// (compressed inputs lose their compression extension first)
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let plain = Compression::from_path(&self.input).strip_extension(&self.input);
            default_output_path(&plain)
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.input.exists() {
            return Err(AnonymizeError::Config(format!(
                "input file not found: {}",
                self.input.display()
            )));
        }
        if !self.input.is_file() {
            return Err(AnonymizeError::Config(format!(
                "input is not a regular file: {}",
                self.input.display()
            )));
        }
        self.spec.validate()
    }
}

/// `<input>.output`, keeping the input's full file name
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".output");
    PathBuf::from(name)
}

/// Builder for AnonymizeConfig
#[derive(Default)]
pub struct AnonymizeConfigBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    spec: Option<AnonymizationSpec>,
    comments: bool,
    layout: InsertLayout,
    row_split: RowSplitMode,
    seed: Option<u64>,
    strict: bool,
    progress: bool,
    dry_run: bool,
}

impl AnonymizeConfigBuilder {
    pub fn input(mut self, path: PathBuf) -> Self {
        self.input = Some(path);
        self
    }

    pub fn output(mut self, path: Option<PathBuf>) -> Self {
        self.output = path;
        self
    }

    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Use an in-memory spec; rules loaded from a config file are merged in
    pub fn spec(mut self, spec: AnonymizationSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn layout(mut self, layout: InsertLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn row_split(mut self, mode: RowSplitMode) -> Self {
        self.row_split = mode;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the AnonymizeConfig
    pub fn build(self) -> Result<AnonymizeConfig> {
        let input = self
            .input
            .ok_or_else(|| AnonymizeError::Config("input file is required".to_string()))?;

        let yaml_config = match self.config_file {
            Some(ref path) => Some(AnonymizeYamlConfig::load(path)?),
            None => None,
        };

        let mut spec = self.spec.unwrap_or_default();
        if let Some(ref yaml) = yaml_config {
            for (table, rules) in &yaml.tables.tables {
                for rule in rules {
                    spec.add_column(table.clone(), rule.clone());
                }
            }
        }
        spec.validate()?;

        // CLI overrides YAML
        let seed = self
            .seed
            .or_else(|| yaml_config.as_ref().and_then(|y| y.seed));

        Ok(AnonymizeConfig {
            input,
            output: self.output,
            spec,
            options: ProcessOptions {
                comments: self.comments,
                layout: self.layout,
                strict: self.strict,
                row_split: self.row_split,
                seed,
            },
            progress: self.progress,
            dry_run: self.dry_run,
        })
    }
}
