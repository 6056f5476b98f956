//! Unit tests for the randomization engine, driven through SQL literals the
//! way INSERT rows present them.

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use regex::Regex;
use sql_anonymizer::anonymizer::strategy::{
    DateTimeStrategy, Randomizer, Strategy, StrategyRegistry, TypeClass, ValueError,
};

fn randomizer() -> Randomizer {
    Randomizer::new(Some(7))
}

/// Strip the surrounding quotes of a literal
fn unquote(value: &str) -> &str {
    assert!(
        value.starts_with('\'') && value.ends_with('\''),
        "not quoted: {value}"
    );
    &value[1..value.len() - 1]
}

mod literal_tests {
    use super::*;

    #[test]
    fn test_null_and_empty_pass_through() {
        let mut r = randomizer();
        for class in [TypeClass::Text, TypeClass::IpAddressV4, TypeClass::Json] {
            assert_eq!(r.randomize_as("NULL", class).unwrap(), "NULL");
            assert_eq!(r.randomize_as("null", class).unwrap(), "null");
            assert_eq!(r.randomize_as("''", class).unwrap(), "''");
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut a = randomizer();
        let mut b = randomizer();
        for (value, ty) in [
            ("'hello world'", "varchar(255)"),
            ("12345", "int(11)"),
            ("'10.1.2.3'", "ip_address"),
            ("'2012-06-01 00:00:00'", "datetime"),
        ] {
            assert_eq!(
                a.randomize(value, ty).unwrap(),
                b.randomize(value, ty).unwrap()
            );
        }
    }

    #[test]
    fn test_unquoted_number_stays_unquoted() {
        let mut r = randomizer();
        let out = r.randomize("-4096", "bigint(20)").unwrap();
        assert!(Regex::new(r"^-[1-9]\d{3}$").unwrap().is_match(&out), "{out}");

        let out = r.randomize("3.25", "float").unwrap();
        assert!(Regex::new(r"^[1-9]\.\d\d$").unwrap().is_match(&out), "{out}");
    }

    #[test]
    fn test_text_keeps_shape() {
        let mut r = randomizer();
        let out = r.randomize("'Alice Smith'", "varchar(64)").unwrap();
        let body = unquote(&out);
        assert!(Regex::new(r"^[A-Z][a-z]{4} [A-Z][a-z]{4}$")
            .unwrap()
            .is_match(body));
    }

    #[test]
    fn test_escaped_quote_in_text() {
        let mut r = randomizer();
        let out = r.randomize(r"'it\'s'", "text").unwrap();
        // Three letters and one symbol, whichever symbol was picked
        let body = sql_anonymizer::parser::unescape_mysql(unquote(&out));
        assert_eq!(body.chars().count(), 4);
        assert!(body.chars().nth(2).unwrap().is_ascii_punctuation());
    }
}

mod class_tests {
    use super::*;

    #[test]
    fn test_uuid_gets_fake_prefix() {
        let mut r = randomizer();
        let out = r
            .randomize("'550e8400-e29b-41d4-a716-446655440000'", "uuid")
            .unwrap();
        let pattern =
            Regex::new(r"^fake[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
                .unwrap();
        assert!(pattern.is_match(unquote(&out)), "{out}");
    }

    #[test]
    fn test_ipv4_octets_in_range() {
        let mut r = randomizer();
        for _ in 0..50 {
            let out = r.randomize("'192.168.100.200'", "ip_address").unwrap();
            let octets: Vec<u32> = unquote(&out)
                .split('.')
                .map(|o| o.parse().unwrap())
                .collect();
            assert_eq!(octets.len(), 4);
            assert!(octets.iter().all(|o| (1..=254).contains(o)), "{out}");
        }
    }

    #[test]
    fn test_ipv4_short_forms() {
        let mut r = randomizer();
        let out = r.randomize("'127.1'", "ip_address").unwrap();
        assert_eq!(unquote(&out).split('.').count(), 2);
        let out = r.randomize("'10.0.1'", "ip_address").unwrap();
        assert_eq!(unquote(&out).split('.').count(), 3);
    }

    #[test]
    fn test_ipv4_rejects_non_address() {
        let mut r = randomizer();
        let err = r
            .randomize_as("'spam egg spam'", TypeClass::IpAddressV4)
            .unwrap_err();
        assert_eq!(err.class, TypeClass::IpAddressV4);
        assert!(!err.reason.contains("spam"));
        assert!(r
            .randomize_as("'1.2.3.4.5'", TypeClass::IpAddressV4)
            .is_err());
    }

    #[test]
    fn test_ipv6_unchanged() {
        let mut r = randomizer();
        assert_eq!(
            r.randomize("'fe80::1'", "ip_address_v6").unwrap(),
            "'fe80::1'"
        );
    }

    #[test]
    fn test_hostname_alphabet() {
        let mut r = randomizer();
        let out = r.randomize("'Node-7.Cluster.Example.COM'", "hostname").unwrap();
        let body = unquote(&out);
        assert!(Regex::new(r"^[a-z0-9]{4}-[a-z0-9]\.[a-z0-9]{7}\.[a-z0-9]{7}\.[a-z0-9]{3}$")
            .unwrap()
            .is_match(body), "{body}");
    }

    #[test]
    fn test_hexstring_keeps_case() {
        let mut r = randomizer();
        let out = r.randomize("'DEADbeef'", "hexstring").unwrap();
        assert!(Regex::new(r"^[0-9A-F]{4}[0-9a-f]{4}$")
            .unwrap()
            .is_match(unquote(&out)), "{out}");
    }

    #[test]
    fn test_hexstring_replaces_non_hex_letters() {
        let mut r = randomizer();
        let input = "deadbeef-secret-ghijk";
        for _ in 0..20 {
            let out = r.randomize_as(&format!("'{}'", input), TypeClass::HexString).unwrap();
            let body = unquote(&out);
            assert!(Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{6}-[0-9a-f]{5}$")
                .unwrap()
                .is_match(body), "{body}");
        }
    }

    #[test]
    fn test_integer_column_holding_text_is_scrambled() {
        let mut r = randomizer();
        for _ in 0..20 {
            let out = r.randomize_as("'John Smith 555-1234'", TypeClass::Integer).unwrap();
            let body = unquote(&out);
            assert!(!body.contains("John"), "{body}");
            assert!(!body.contains("Smith"), "{body}");
        }
    }

    #[test]
    fn test_pathname_keeps_separators() {
        let mut r = randomizer();
        let input = "/var/lib/nova/instances/_base/disk.local";
        let out = r.randomize(&format!("'{}'", input), "pathname").unwrap();
        let body = unquote(&out);
        assert_eq!(body.len(), input.len());
        for (a, b) in input.chars().zip(body.chars()) {
            if "/._-".contains(a) {
                assert_eq!(a, b);
            }
        }
        assert!(!body.contains(char::is_whitespace));
    }

    #[test]
    fn test_datetime_is_well_formed() {
        let mut r = randomizer();
        for _ in 0..50 {
            let out = r.randomize("'2013-05-17 08:09:10'", "datetime").unwrap();
            let parsed = NaiveDateTime::parse_from_str(unquote(&out), "%Y-%m-%d %H:%M:%S");
            assert!(parsed.is_ok(), "{out}");
        }
    }

    #[test]
    fn test_datetime_year_range() {
        let strategy = DateTimeStrategy::new(2000, 1999);
        let mut rng = StdRng::seed_from_u64(1);
        let out = strategy.apply("x", &mut rng).unwrap();
        assert!(out.starts_with("1999-") || out.starts_with("2000-"), "{out}");
    }

    #[test]
    fn test_json_keeps_keys_and_types() {
        let mut r = randomizer();
        let input = r#"'{\"name\": \"db01\", \"cores\": 16, \"tags\": [\"a\", \"b\"], \"ha\": true, \"note\": null}'"#;
        let out = r.randomize(input, "json").unwrap();
        let body = sql_anonymizer::parser::unescape_mysql(unquote(&out));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "cores", "tags", "ha", "note"]);
        assert!(value["name"].is_string());
        assert!(value["cores"].as_u64().unwrap() >= 10);
        assert_eq!(value["tags"].as_array().unwrap().len(), 2);
        assert!(value["ha"].is_boolean());
        assert!(value["note"].is_null());
    }

    #[test]
    fn test_broken_json_is_an_error() {
        let mut r = randomizer();
        assert!(r.randomize_as("'{not json'", TypeClass::Json).is_err());
    }

    #[test]
    fn test_unknown_type_detects_json() {
        let mut r = randomizer();
        let out = r.randomize(r#"'{\"k\": \"v\"}'"#, "blob").unwrap();
        let body = sql_anonymizer::parser::unescape_mysql(unquote(&out));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value.get("k").is_some());
    }
}

mod registry_tests {
    use super::*;

    struct Redacted;

    impl Strategy for Redacted {
        fn apply(&self, _value: &str, _rng: &mut dyn RngCore) -> Result<String, ValueError> {
            Ok("REDACTED".to_string())
        }

        fn class(&self) -> TypeClass {
            TypeClass::Text
        }
    }

    #[test]
    fn test_custom_strategy_replaces_default() {
        let mut registry = StrategyRegistry::default();
        registry.register(Box::new(Redacted));
        let mut r = randomizer().with_registry(registry);

        assert_eq!(r.randomize("'secret'", "varchar(8)").unwrap(), "'REDACTED'");
        // Other classes keep their defaults
        let out = r.randomize("7", "int").unwrap();
        assert!(out.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_empty_registry_falls_back_to_scramble() {
        let registry = StrategyRegistry::empty();
        assert_eq!(registry.get(TypeClass::Hostname).class(), TypeClass::Default);

        let mut r = randomizer().with_registry(registry);
        let out = r.randomize_as("'abc'", TypeClass::Hostname).unwrap();
        assert!(Regex::new(r"^'[a-z]{3}'$").unwrap().is_match(&out));
    }
}
