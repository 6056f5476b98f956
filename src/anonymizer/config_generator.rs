//! Config generator for anonymization YAML skeletons.
//!
//! Captures every table schema in the input and suggests a randomization
//! class per column based on its name and declared type.

use crate::anonymizer::config::{AnonymizationSpec, AnonymizeConfig, ProcessOptions};
use crate::anonymizer::processor::DumpProcessor;
use crate::anonymizer::strategy::TypeClass;
use crate::compression::Compression;
use crate::error::Result;
use crate::schema::{bare_type_name, SchemaRegistry};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

/// Column analysis result for config generation
#[derive(Debug, Clone)]
pub struct ColumnSuggestion {
    pub table: String,
    pub column: String,
    pub declared_type: String,
    /// Suggested class; `Some` with the class implied by the SQL type means
    /// no `anonymize_as` is needed
    pub suggested: Option<TypeClass>,
    pub confidence: Confidence,
}

/// Confidence level for sensitive-column detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

impl Confidence {
    fn as_comment(&self) -> &'static str {
        match self {
            Confidence::High => "",
            Confidence::Medium => "  # Medium confidence",
            Confidence::Low => "  # Low confidence - review",
            Confidence::None => "",
        }
    }
}

/// `<input>.anonymize.yaml`, with any compression extension removed first.
fn default_config_path(input: &Path) -> PathBuf {
    let mut path = Compression::from_path(input)
        .strip_extension(input)
        .into_os_string();
    path.push(".anonymize.yaml");
    PathBuf::from(path)
}

/// Generate a YAML config file for the configured input.
///
/// Written to the `-o` path if given, otherwise `<input>.anonymize.yaml`.
pub fn generate_config(config: &AnonymizeConfig) -> Result<PathBuf> {
    let registry = capture_schema(&config.input)?;
    let suggestions = analyze_columns(&registry);

    let output_path = config
        .output
        .clone()
        .unwrap_or_else(|| default_config_path(&config.input));

    let yaml = render_config(&suggestions);
    let mut file = File::create(&output_path)?;
    file.write_all(yaml.as_bytes())?;

    eprintln!("Generated config: {}", output_path.display());
    eprintln!(
        "Found {} columns with potentially sensitive data",
        suggestions.iter().filter(|s| s.suggested.is_some()).count()
    );

    Ok(output_path)
}

/// Run a pass with no columns configured, keeping only the schemas
fn capture_schema(input: &Path) -> Result<SchemaRegistry> {
    let file = File::open(input)?;
    let reader = Compression::from_path(input).wrap_reader(Box::new(file))?;
    let mut processor = DumpProcessor::new(AnonymizationSpec::new(), ProcessOptions::default());
    processor.process_stream(BufReader::new(reader), &mut io::sink())?;
    Ok(processor.into_schema())
}

/// Suggest a class for every captured column
pub fn analyze_columns(registry: &SchemaRegistry) -> Vec<ColumnSuggestion> {
    let mut suggestions = Vec::new();
    for table in registry.iter() {
        for column in &table.columns {
            let (suggested, confidence) = detect_sensitive(&column.name, &column.declared_type);
            suggestions.push(ColumnSuggestion {
                table: table.name.clone(),
                column: column.name.clone(),
                declared_type: column.declared_type.clone(),
                suggested,
                confidence,
            });
        }
    }
    suggestions
}

/// Detect sensitive columns from name patterns, falling back to the type
fn detect_sensitive(column_name: &str, declared_type: &str) -> (Option<TypeClass>, Confidence) {
    let name = column_name.to_lowercase();
    let base_type = bare_type_name(declared_type).to_lowercase();
    let textual = matches!(
        base_type.as_str(),
        "varchar" | "char" | "text" | "mediumtext" | "longtext" | "tinytext"
    );

    // High confidence patterns
    if name.contains("uuid") && textual {
        return (Some(TypeClass::Uuid), Confidence::High);
    }
    if (name == "ip" || name.contains("ip_address") || name.ends_with("_ip"))
        && textual
        && !name.contains("v6")
    {
        return (Some(TypeClass::IpAddressV4), Confidence::High);
    }
    if name.contains("hostname") || name == "host" || name.ends_with("_host") {
        return (Some(TypeClass::Hostname), Confidence::High);
    }
    if name.contains("password") || name.contains("secret") || name.contains("token") {
        return (Some(TypeClass::Text), Confidence::High);
    }
    if name.contains("email") || name.contains("username") || name == "user" {
        return (Some(TypeClass::Text), Confidence::High);
    }

    // Medium confidence patterns
    if base_type == "json" {
        return (Some(TypeClass::Json), Confidence::Medium);
    }
    if name.contains("path") || name.ends_with("_dir") || name.ends_with("_file") {
        return (Some(TypeClass::Pathname), Confidence::Medium);
    }
    if name.contains("hash") || name.contains("fingerprint") || name.contains("checksum") {
        return (Some(TypeClass::HexString), Confidence::Medium);
    }
    if name.contains("address") || name.contains("phone") || name.ends_with("name") {
        return (Some(TypeClass::Text), Confidence::Medium);
    }

    // Low confidence patterns
    if textual && (name.contains("info") || name.contains("description") || name.contains("note"))
    {
        return (Some(TypeClass::Text), Confidence::Low);
    }

    (None, Confidence::None)
}

/// Render suggestions as an anonymization YAML config
pub fn render_config(suggestions: &[ColumnSuggestion]) -> String {
    let mut yaml = String::new();

    // Header
    yaml.push_str("# sql-anonymizer configuration\n");
    yaml.push_str("# Generated by: sql-anonymizer <input> --generate-config\n");
    yaml.push_str("#\n");
    yaml.push_str("# Review and modify this file before anonymizing.\n");
    yaml.push_str("# `type` must agree with the table definition in the dump.\n");
    yaml.push('\n');

    yaml.push_str("# Random seed for reproducible output (optional)\n");
    yaml.push_str("# seed: 12345\n\n");

    if suggestions.iter().any(|s| s.suggested.is_some()) {
        yaml.push_str("tables:\n");
    } else {
        yaml.push_str("tables: {}\n");
    }

    // Group by table, keeping definition order within each table
    let mut by_table: BTreeMap<&str, Vec<&ColumnSuggestion>> = BTreeMap::new();
    for suggestion in suggestions {
        by_table
            .entry(suggestion.table.as_str())
            .or_default()
            .push(suggestion);
    }

    for (table, columns) in by_table {
        let any_suggested = columns.iter().any(|c| c.suggested.is_some());
        if any_suggested {
            yaml.push_str(&format!("  {}:\n", table));
        } else {
            yaml.push_str(&format!("  # {}:  # No sensitive columns detected\n", table));
        }

        for col in columns {
            match col.suggested {
                Some(class) => {
                    yaml.push_str(&format!("    - column: {}\n", col.column));
                    yaml.push_str(&format!("      type: \"{}\"\n", col.declared_type));
                    if TypeClass::from_type_name(&col.declared_type) != class {
                        yaml.push_str(&format!("      anonymize_as: {}\n", class));
                    }
                    let note = col.confidence.as_comment();
                    if !note.is_empty() {
                        yaml.push_str(&format!("     {}\n", note.trim()));
                    }
                }
                None => {
                    yaml.push_str(&format!("    # - column: {}\n", col.column));
                    yaml.push_str(&format!("    #   type: \"{}\"\n", col.declared_type));
                }
            }
        }
    }

    yaml
}
