//! Line-oriented classification of MySQL dump files.
//!
//! A dump is processed one line at a time. Each line is classified against a
//! small set of regular expressions; which ones apply depends on whether a
//! `CREATE TABLE` block is currently open.

pub mod fields;
pub mod values;

pub use fields::{split_fields, FieldSpan, FieldSpans, FieldSplitter};
pub use values::{escape_mysql, split_rows, unescape_mysql, RowSplitMode};

use once_cell::sync::Lazy;
use regex::Regex;

/// Blank lines
static BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());

/// `--` and `/*` comments (includes mysqldump's `/*!40101 ... */` directives)
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:--|/\*)").unwrap());

/// Statements that never carry schema or data
static IGNORED_STATEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:LOCK|UNLOCK|DROP)").unwrap());

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?`(?P<table>[0-9A-Za-z_$]+)`").unwrap()
});

/// Index and constraint lines inside a table definition
static TABLE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:PRIMARY\s+KEY|UNIQUE\s+KEY|KEY|CONSTRAINT|FULLTEXT\s+KEY|SPATIAL\s+KEY)")
        .unwrap()
});

/// Column definition: backticked name followed by a bare type token with an
/// optional size or precision suffix
static COLUMN_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*`(?P<name>[0-9A-Za-z_$]+)`\s+(?P<type>[A-Za-z_]+(?:\(\d+(?:,\s*\d+)?\))?)")
        .unwrap()
});

static END_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\)\s*ENGINE=(?P<engine>\w+)").unwrap());

static INSERT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*INSERT\s+INTO\s+`(?P<table>[0-9A-Za-z_$]+)`\s+VALUES\s*(?P<values>.*);\s*$")
        .unwrap()
});

/// Any INSERT naming a backticked table, recognized form or not
static INSERT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*INSERT\s+(?:IGNORE\s+)?INTO\s+`(?P<table>[^`]+)`").unwrap());

/// Classification of one dump line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Blank, comment, LOCK/UNLOCK/DROP: always passed through
    Ignorable,
    /// Start of a table definition
    CreateTable { table: &'a str },
    /// PRIMARY KEY / KEY / CONSTRAINT / UNIQUE KEY inside a table definition
    TableConstraint,
    /// Column definition inside a table definition
    ColumnDef {
        name: &'a str,
        declared_type: &'a str,
    },
    /// `) ENGINE=...` terminator of a table definition
    EndTable { engine: &'a str },
    /// Single-line `INSERT INTO `t` VALUES (...),(...);`
    Insert {
        table: &'a str,
        /// Byte offset of the tuple list within the line
        values_start: usize,
        values_end: usize,
    },
    /// An INSERT for a table in a form this parser does not rewrite
    /// (column lists, multi-line statements, INSERT IGNORE)
    UnsupportedInsert { table: &'a str },
    /// Anything else
    Other,
}

/// Classify a line (without its line terminator).
///
/// `in_table_def` selects whether column, constraint and terminator
/// patterns are considered.
pub fn classify_line(line: &str, in_table_def: bool) -> LineKind<'_> {
    if BLANK_RE.is_match(line) || COMMENT_RE.is_match(line) || IGNORED_STATEMENT_RE.is_match(line)
    {
        return LineKind::Ignorable;
    }

    if let Some(caps) = CREATE_TABLE_RE.captures(line) {
        if let Some(table) = caps.name("table") {
            return LineKind::CreateTable {
                table: table.as_str(),
            };
        }
    }

    if in_table_def {
        if TABLE_CONSTRAINT_RE.is_match(line) {
            return LineKind::TableConstraint;
        }

        if let Some(caps) = COLUMN_DEF_RE.captures(line) {
            if let (Some(name), Some(ty)) = (caps.name("name"), caps.name("type")) {
                return LineKind::ColumnDef {
                    name: name.as_str(),
                    declared_type: ty.as_str(),
                };
            }
        }

        if let Some(caps) = END_TABLE_RE.captures(line) {
            let engine = caps.name("engine").map(|m| m.as_str()).unwrap_or_default();
            return LineKind::EndTable { engine };
        }
    }

    if let Some(caps) = INSERT_RE.captures(line) {
        if let (Some(table), Some(values)) = (caps.name("table"), caps.name("values")) {
            return LineKind::Insert {
                table: table.as_str(),
                values_start: values.start(),
                values_end: values.end(),
            };
        }
    }

    if let Some(caps) = INSERT_PREFIX_RE.captures(line) {
        if let Some(table) = caps.name("table") {
            return LineKind::UnsupportedInsert {
                table: table.as_str(),
            };
        }
    }

    LineKind::Other
}

/// Split a raw line into its content and its terminator (`\n`, `\r\n` or
/// nothing on the last line of a file)
pub fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(stripped) = line.strip_suffix("\r\n") {
        (stripped, "\r\n")
    } else if let Some(stripped) = line.strip_suffix('\n') {
        (stripped, "\n")
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignorable_lines() {
        for line in [
            "",
            "   ",
            "-- MySQL dump 10.13",
            "/*!40101 SET NAMES utf8 */;",
            "LOCK TABLES `t` WRITE;",
            "UNLOCK TABLES;",
            "DROP TABLE IF EXISTS `t`;",
        ] {
            assert_eq!(classify_line(line, false), LineKind::Ignorable, "{line}");
            assert_eq!(classify_line(line, true), LineKind::Ignorable, "{line}");
        }
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            classify_line("CREATE TABLE `compute_nodes` (", false),
            LineKind::CreateTable {
                table: "compute_nodes"
            }
        );
    }

    #[test]
    fn test_column_definitions_only_inside_table() {
        let line = "  `vcpus` int(11) NOT NULL,";
        assert_eq!(
            classify_line(line, true),
            LineKind::ColumnDef {
                name: "vcpus",
                declared_type: "int(11)"
            }
        );
        assert_eq!(classify_line(line, false), LineKind::Other);
    }

    #[test]
    fn test_column_types() {
        let cases = [
            ("  `cpu_info` mediumtext NOT NULL,", "mediumtext"),
            ("  `name` varchar(255) DEFAULT NULL,", "varchar(255)"),
            ("  `rxtx_factor` float DEFAULT NULL,", "float"),
            ("  `price` decimal(10,2) NOT NULL,", "decimal(10,2)"),
        ];
        for (line, expected) in cases {
            match classify_line(line, true) {
                LineKind::ColumnDef { declared_type, .. } => assert_eq!(declared_type, expected),
                other => panic!("expected column definition, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_constraints_are_not_columns() {
        for line in [
            "  PRIMARY KEY (`id`),",
            "  UNIQUE KEY `uniq_name` (`name`),",
            "  KEY `idx_host` (`host`),",
            "  CONSTRAINT `fk` FOREIGN KEY (`a`) REFERENCES `b` (`id`)",
        ] {
            assert_eq!(classify_line(line, true), LineKind::TableConstraint, "{line}");
        }
    }

    #[test]
    fn test_end_table() {
        assert_eq!(
            classify_line(") ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8;", true),
            LineKind::EndTable { engine: "InnoDB" }
        );
        assert_eq!(
            classify_line(") ENGINE=MyISAM;", true),
            LineKind::EndTable { engine: "MyISAM" }
        );
        assert_eq!(classify_line(") ENGINE=InnoDB;", false), LineKind::Other);
    }

    #[test]
    fn test_insert() {
        let line = "INSERT INTO `t` VALUES (1,'a'),(2,'b');";
        match classify_line(line, false) {
            LineKind::Insert {
                table,
                values_start,
                values_end,
            } => {
                assert_eq!(table, "t");
                assert_eq!(&line[values_start..values_end], "(1,'a'),(2,'b')");
            }
            other => panic!("expected insert, got {other:?}"),
        }
        assert!(matches!(
            classify_line(line, true),
            LineKind::Insert { table: "t", .. }
        ));
    }

    #[test]
    fn test_unsupported_insert_forms() {
        assert_eq!(
            classify_line("INSERT INTO `t` (`id`) VALUES (1);", false),
            LineKind::UnsupportedInsert { table: "t" }
        );
        assert_eq!(
            classify_line("INSERT INTO `t` VALUES (1,", false),
            LineKind::UnsupportedInsert { table: "t" }
        );
    }

    #[test]
    fn test_other() {
        assert_eq!(classify_line("SET @a = 1;", false), LineKind::Other);
        assert_eq!(classify_line("  `x` int(11),", false), LineKind::Other);
    }

    #[test]
    fn test_split_line_ending() {
        assert_eq!(split_line_ending("abc\n"), ("abc", "\n"));
        assert_eq!(split_line_ending("abc\r\n"), ("abc", "\r\n"));
        assert_eq!(split_line_ending("abc"), ("abc", ""));
    }
}
