//! Quote-aware field splitting for row tuples.
//!
//! Splits `1,'foo, bar',"baz"` into `1`, `'foo, bar'` and `"baz"`: delimiters
//! inside single- or double-quoted spans are literal content. The splitter
//! reports byte spans so callers can substitute fields in place without
//! disturbing the surrounding whitespace.

use smallvec::SmallVec;

/// Byte range of one field within the split input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub end: usize,
}

impl FieldSpan {
    /// Slice the field out of the input it was computed from
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        &input[self.start..self.end]
    }
}

/// Field spans for a single row; most dump rows fit inline
pub type FieldSpans = SmallVec<[FieldSpan; 16]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Normal,
    InSingleQuote,
    InDoubleQuote,
}

/// Three-state field splitter (normal, in single quote, in double quote)
#[derive(Debug, Clone, Copy)]
pub struct FieldSplitter {
    delimiter: char,
}

impl Default for FieldSplitter {
    fn default() -> Self {
        Self::new(',')
    }
}

impl FieldSplitter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Split `input` into field spans.
    ///
    /// In the normal state a delimiter closes the current field (empty
    /// fields are dropped), spaces before a field's first character are
    /// skipped, and a quote character opens a quoted span. Inside a quoted
    /// span every character belongs to the field; a backslash escapes the
    /// character after it, so `'it\'s'` stays one span.
    pub fn split_spans(&self, input: &str) -> FieldSpans {
        let mut spans = FieldSpans::new();
        let mut state = SplitState::Normal;
        let mut field_start: Option<usize> = None;
        let mut escaped = false;

        for (i, c) in input.char_indices() {
            match state {
                SplitState::Normal => {
                    if c == self.delimiter {
                        if let Some(start) = field_start.take() {
                            spans.push(FieldSpan { start, end: i });
                        }
                        continue;
                    }

                    if c == ' ' && field_start.is_none() {
                        continue;
                    }

                    if field_start.is_none() {
                        field_start = Some(i);
                    }

                    match c {
                        '\'' => state = SplitState::InSingleQuote,
                        '"' => state = SplitState::InDoubleQuote,
                        _ => {}
                    }
                }
                SplitState::InSingleQuote | SplitState::InDoubleQuote => {
                    if escaped {
                        escaped = false;
                        continue;
                    }
                    let closing = if state == SplitState::InSingleQuote {
                        '\''
                    } else {
                        '"'
                    };
                    if c == '\\' {
                        escaped = true;
                    } else if c == closing {
                        state = SplitState::Normal;
                    }
                }
            }
        }

        if let Some(start) = field_start {
            spans.push(FieldSpan {
                start,
                end: input.len(),
            });
        }

        spans
    }

    /// Split `input` into borrowed field strings
    pub fn split<'a>(&self, input: &'a str) -> Vec<&'a str> {
        self.split_spans(input)
            .iter()
            .map(|span| span.slice(input))
            .collect()
    }
}

/// Split on commas with the default splitter
pub fn split_fields(input: &str) -> Vec<&str> {
    FieldSplitter::default().split(input)
}
