//! Row tuple splitting for `VALUES (...),(...)` lists and MySQL string
//! literal escaping.

use super::fields::FieldSpan;

/// How the tuple list of an INSERT is cut into rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowSplitMode {
    /// Track parenthesis depth and quoting; a `),(` inside a string value
    /// does not end the row
    #[default]
    QuoteAware,
    /// Split on every literal `),(`, as older dump rewriters did
    Literal,
}

/// Split a tuple list into the spans of each row's contents (without the
/// enclosing parentheses).
pub fn split_rows(values: &str, mode: RowSplitMode) -> Result<Vec<FieldSpan>, String> {
    match mode {
        RowSplitMode::QuoteAware => split_rows_quote_aware(values),
        RowSplitMode::Literal => split_rows_literal(values),
    }
}

fn split_rows_quote_aware(values: &str) -> Result<Vec<FieldSpan>, String> {
    let mut rows = Vec::new();
    let mut depth = 0usize;
    let mut row_start = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in values.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                if depth == 0 {
                    return Err(format!("quoted value outside of a row at offset {}", i));
                }
                quote = Some(c);
            }
            '(' => {
                if depth == 0 {
                    row_start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(format!("unbalanced ')' at offset {}", i));
                }
                depth -= 1;
                if depth == 0 {
                    rows.push(FieldSpan {
                        start: row_start,
                        end: i,
                    });
                }
            }
            ',' if depth == 0 => {}
            c if depth == 0 && c.is_whitespace() => {}
            c if depth == 0 => {
                return Err(format!("unexpected {:?} between rows at offset {}", c, i));
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".to_string());
    }
    if depth != 0 {
        return Err("unterminated row tuple".to_string());
    }
    if rows.is_empty() {
        return Err("no row tuples found".to_string());
    }

    Ok(rows)
}

fn split_rows_literal(values: &str) -> Result<Vec<FieldSpan>, String> {
    let trimmed_start = values.len() - values.trim_start().len();
    let trimmed_end = values.trim_end().len();
    if trimmed_start >= trimmed_end {
        return Err("no row tuples found".to_string());
    }

    let mut rows = Vec::new();
    let mut start = trimmed_start;
    let body = &values[..trimmed_end];

    for (pos, sep) in body.match_indices("),(") {
        if pos < start {
            continue;
        }
        rows.push(FieldSpan { start, end: pos });
        start = pos + sep.len();
    }
    rows.push(FieldSpan {
        start,
        end: trimmed_end,
    });

    if let Some(first) = rows.first_mut() {
        if values[first.start..first.end].starts_with('(') {
            first.start += 1;
        }
    }
    if let Some(last) = rows.last_mut() {
        if last.end > last.start && values[last.start..last.end].ends_with(')') {
            last.end -= 1;
        }
    }

    Ok(rows)
}

/// Decode a MySQL string literal body (without the surrounding quotes)
pub fn unescape_mysql(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('0') => result.push('\0'),
                Some('b') => result.push('\u{8}'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('Z') => result.push('\u{1a}'),
                // LIKE wildcards keep their backslash
                Some(c @ ('%' | '_')) => {
                    result.push('\\');
                    result.push(c);
                }
                Some(other) => result.push(other),
                None => result.push('\\'),
            },
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                result.push('\'');
            }
            _ => result.push(c),
        }
    }

    result
}

/// Encode a string as a MySQL string literal body, the way mysqldump does
pub fn escape_mysql(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 8);

    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '\0' => result.push_str("\\0"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\u{1a}' => result.push_str("\\Z"),
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &str, mode: RowSplitMode) -> Vec<&str> {
        split_rows(values, mode)
            .unwrap()
            .iter()
            .map(|s| s.slice(values))
            .collect()
    }

    #[test]
    fn test_quote_aware_rows() {
        assert_eq!(
            rows("(1,'a'),(2,'b')", RowSplitMode::QuoteAware),
            vec!["1,'a'", "2,'b'"]
        );
        assert_eq!(
            rows("(1,'a'), (2,'b')", RowSplitMode::QuoteAware),
            vec!["1,'a'", "2,'b'"]
        );
    }

    #[test]
    fn test_quote_aware_ignores_separator_in_string() {
        assert_eq!(
            rows("(1,'x),(y'),(2,'z')", RowSplitMode::QuoteAware),
            vec!["1,'x),(y'", "2,'z'"]
        );
    }

    #[test]
    fn test_literal_mis_splits_separator_in_string() {
        assert_eq!(
            rows("(1,'x),(y'),(2,'z')", RowSplitMode::Literal),
            vec!["1,'x", "y'", "2,'z'"]
        );
    }

    #[test]
    fn test_literal_rows() {
        assert_eq!(
            rows("(1,'a'),(2,'b')", RowSplitMode::Literal),
            vec!["1,'a'", "2,'b'"]
        );
        assert_eq!(rows("(7)", RowSplitMode::Literal), vec!["7"]);
    }

    #[test]
    fn test_nested_parens_stay_in_row() {
        assert_eq!(
            rows("(1,POINT(1,2)),(2,NULL)", RowSplitMode::QuoteAware),
            vec!["1,POINT(1,2)", "2,NULL"]
        );
    }

    #[test]
    fn test_malformed_tuple_lists() {
        assert!(split_rows("(1,'a'", RowSplitMode::QuoteAware).is_err());
        assert!(split_rows("(1,'a)", RowSplitMode::QuoteAware).is_err());
        assert!(split_rows("1,2", RowSplitMode::QuoteAware).is_err());
        assert!(split_rows("", RowSplitMode::QuoteAware).is_err());
        assert!(split_rows("  ", RowSplitMode::Literal).is_err());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_mysql(r"it\'s"), "it's");
        assert_eq!(unescape_mysql(r#"{\"a\": 1}"#), r#"{"a": 1}"#);
        assert_eq!(unescape_mysql(r"a\nb\\c"), "a\nb\\c");
        assert_eq!(unescape_mysql("it''s"), "it's");
        assert_eq!(unescape_mysql(r"100\%"), r"100\%");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_mysql("it's"), r"it\'s");
        assert_eq!(escape_mysql(r#"{"a": 1}"#), r#"{\"a\": 1}"#);
        assert_eq!(escape_mysql("a\nb\\c"), r"a\nb\\c");
        assert_eq!(escape_mysql("tab\there"), "tab\there");
    }
}
