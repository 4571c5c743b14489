//! Weighted sub-prompt tokenizer.
//!
//! Splits a prompt into segments of the form `text:weight`, scanning left
//! to right with no lookahead beyond the next delimiter:
//!
//! ```text
//! a cat:0.5 a dog:1.5 watercolor
//! └─┬─┘ └┬┘ └─┬─┘ └┬┘ └───┬────┘
//!  text  w   text  w    text (weight 1.0)
//! ```
//!
//! A `:` ends a sub-prompt; the weight field runs up to the next space,
//! which is consumed as the separator. A missing, empty, or unparsable
//! weight falls back to [`DEFAULT_WEIGHT`]; only the unparsable case is
//! reported, as a [`WeightDiagnostic`] and a `tracing` warning.

use crate::error::WeightParseError;
use crate::prompt::{DEFAULT_WEIGHT, PromptSpan, SubPrompt, WeightDiagnostic, WeightedPrompt};
use std::borrow::Cow;
use std::ops::Range;
use tracing::{debug, warn};

const WEIGHT_DELIMITER: char = ':';
const FIELD_SEPARATOR: char = ' ';

enum ScanState {
    /// Looking for the `:` that ends the next sub-prompt.
    Prompt,
    /// Reading the weight field for the pending sub-prompt text.
    Weight { text: Range<usize> },
    Done,
}

/// Tokenize a prompt into weighted sub-prompts.
///
/// Never fails: any input, including the empty string, yields a
/// well-formed (possibly empty) result.
pub fn tokenize(input: &str) -> WeightedPrompt {
    let mut out = WeightedPrompt::default();
    let mut cursor = 0;
    let mut state = ScanState::Prompt;

    // Both delimiters are ASCII, so every offset below is a char boundary.
    loop {
        state = match state {
            ScanState::Prompt => {
                let rest = &input[cursor..];
                match rest.find(WEIGHT_DELIMITER) {
                    Some(i) => {
                        let text = cursor..cursor + i;
                        cursor += i + WEIGHT_DELIMITER.len_utf8();
                        ScanState::Weight { text }
                    }
                    None => {
                        if !rest.is_empty() {
                            let span = PromptSpan {
                                text: cursor..input.len(),
                                weight_field: None,
                                separator: None,
                            };
                            out.push(SubPrompt::new(rest, DEFAULT_WEIGHT).with_span(span));
                        }
                        ScanState::Done
                    }
                }
            }
            ScanState::Weight { text } => {
                let rest = &input[cursor..];
                let len = rest.find(FIELD_SEPARATOR).unwrap_or(rest.len());
                let field = &rest[..len];

                let weight = if field.is_empty() {
                    DEFAULT_WEIGHT
                } else {
                    match parse_weight(field) {
                        Ok(w) => w,
                        Err(e) => {
                            warn!(field = %e.field, offset = cursor, "{e}");
                            out.diagnostics.push(WeightDiagnostic {
                                field: e.field,
                                offset: cursor,
                            });
                            DEFAULT_WEIGHT
                        }
                    }
                };

                let separator = (len < rest.len()).then_some(cursor + len);
                let span = PromptSpan {
                    text: text.clone(),
                    weight_field: Some(cursor..cursor + len),
                    separator,
                };
                cursor += len + separator.map_or(0, |_| FIELD_SEPARATOR.len_utf8());

                out.push(SubPrompt::new(&input[text], weight).with_span(span));
                ScanState::Prompt
            }
            ScanState::Done => break,
        };
    }

    debug!(
        subprompts = out.len(),
        diagnostics = out.diagnostics.len(),
        "Prompt tokenized"
    );
    out
}

/// Tokenize into the two parallel sequences `(texts, weights)`.
pub fn split_weighted_subprompts(input: &str) -> (Vec<String>, Vec<f64>) {
    tokenize(input).into_parts()
}

/// Parse a single weight field.
///
/// Accepts Rust's `f64` syntax after trimming surrounding whitespace
/// (`"2"`, `"0.5"`, `"-1"`, `"1e-2"`, `"inf"`). A single `_` between two
/// digits is a digit separator (`"1_000"`, `".1_1"`); any other `_` makes
/// the field unparsable.
pub fn parse_weight(field: &str) -> Result<f64, WeightParseError> {
    let invalid = || WeightParseError {
        field: field.to_string(),
    };
    let digits = strip_digit_separators(field.trim()).ok_or_else(invalid)?;
    digits.parse::<f64>().map_err(|_| invalid())
}

/// Remove `_` separators, or `None` if one is not flanked by ASCII digits.
fn strip_digit_separators(field: &str) -> Option<Cow<'_, str>> {
    if !field.contains('_') {
        return Some(Cow::Borrowed(field));
    }

    let bytes = field.as_bytes();
    let is_digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let mut out = String::with_capacity(field.len());
    for (i, c) in field.char_indices() {
        if c != '_' {
            out.push(c);
        } else if i == 0 || !is_digit_at(i - 1) || !is_digit_at(i + 1) {
            return None;
        }
    }
    Some(Cow::Owned(out))
}

// ─── Tests ──────────────────────────────────────────────────────────
