//! Unit tests for schema capture.

use sql_anonymizer::anonymizer::{AnonymizationSpec, DumpProcessor, ProcessOptions};
use sql_anonymizer::schema::{bare_type_name, SchemaRegistry, TableSchema};

mod registry_tests {
    use super::*;

    #[test]
    fn test_tables_iterate_in_definition_order() {
        let mut registry = SchemaRegistry::new();
        for name in ["zebra", "alpha", "middle"] {
            registry.begin_table(name);
            registry.add_column("id", "int(11)");
            registry.end_table();
        }

        let names: Vec<&str> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zebra", "alpha", "middle"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_redefined_table_starts_over() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("t");
        registry.add_column("a", "int");
        registry.add_column("b", "int");
        registry.end_table();

        registry.begin_table("t");
        registry.add_column("c", "varchar(10)");
        registry.end_table();

        let table = registry.lookup("t").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns[0].name, "c");
        assert_eq!(table.columns[0].position, 1);
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn test_unterminated_table_sealed_by_next() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("first");
        registry.add_column("a", "int");
        assert_eq!(registry.current_table(), Some("first"));

        registry.begin_table("second");
        assert_eq!(registry.current_table(), Some("second"));
        assert!(registry.lookup("first").unwrap().is_sealed());
        assert!(!registry.lookup("second").unwrap().is_sealed());
    }

    #[test]
    fn test_open_state() {
        let mut registry = SchemaRegistry::new();
        assert!(!registry.in_table_def());
        registry.begin_table("t");
        assert!(registry.in_table_def());
        registry.end_table();
        assert!(!registry.in_table_def());
        assert!(registry.current_table().is_none());
    }

    #[test]
    fn test_type_frequency_most_common_first() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("a");
        registry.add_column("id", "int(11)");
        registry.add_column("name", "varchar(255)");
        registry.end_table();
        registry.begin_table("b");
        registry.add_column("id", "int(11)");
        registry.add_column("created_at", "datetime");
        registry.end_table();

        let freq = registry.type_frequency();
        assert_eq!(freq[0], ("int(11)".to_string(), 2));
        assert_eq!(freq.len(), 3);
        // Ties ordered by name
        assert_eq!(freq[1].0, "datetime");
        assert_eq!(freq[2].0, "varchar(255)");
    }

    #[test]
    fn test_lookup_is_case_sensitive_for_tables() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("Users");
        registry.end_table();
        assert!(registry.lookup("Users").is_some());
        assert!(registry.lookup("users").is_none());
    }
}

mod table_tests {
    use super::*;

    #[test]
    fn test_new_table_is_empty_and_open() {
        let table = TableSchema::new("t");
        assert!(table.is_empty());
        assert!(!table.is_sealed());
        assert!(table.get_column("id").is_none());
    }

    #[test]
    fn test_type_name_strips_suffix() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("t");
        let column = registry.add_column("price", "decimal(10,2)").unwrap();
        assert_eq!(column.type_name(), "decimal");
        assert_eq!(bare_type_name(" BIGINT(20) UNSIGNED "), "BIGINT");
    }

    #[test]
    fn test_schema_serializes() {
        let mut registry = SchemaRegistry::new();
        registry.begin_table("t");
        registry.add_column("id", "int(11)");
        let table = registry.end_table().unwrap();

        let json = serde_json::to_value(table).unwrap();
        assert_eq!(json["name"], "t");
        assert_eq!(json["columns"][0]["position"], 1);
        assert_eq!(json["columns"][0]["declared_type"], "int(11)");
    }
}

mod capture_tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn test_capture_from_dump() {
        let dump = "\
CREATE TABLE `hosts` (
  `id` int(11) NOT NULL,
  `name` varchar(64) NOT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB;
INSERT INTO `hosts` VALUES (1,'a');
CREATE TABLE IF NOT EXISTS `logs` (
  `line` mediumtext
) ENGINE=MyISAM;
";
        let mut processor = DumpProcessor::new(AnonymizationSpec::new(), ProcessOptions::default());
        processor
            .process_stream(Cursor::new(dump), &mut io::sink())
            .unwrap();
        let registry = processor.into_schema();

        let hosts = registry.lookup("hosts").unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts.get_column("name").unwrap().declared_type, "varchar(64)");

        let logs = registry.lookup("logs").unwrap();
        assert!(logs.is_sealed());
        assert_eq!(logs.columns[0].declared_type, "mediumtext");
    }
}
