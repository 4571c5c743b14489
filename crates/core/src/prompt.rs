//! Data model for tokenized prompts: sub-prompts, their weights, and the
//! diagnostics produced while scanning.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Weight given to a sub-prompt whose weight field is absent, empty, or
/// not a number.
pub const DEFAULT_WEIGHT: f64 = 1.0;

// ── SubPrompt ─────────────────────────────────────────────────────────────

/// One segment of the input prompt and its blend weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPrompt {
    /// The sub-prompt text, delimiters excluded. May be empty.
    pub text: String,
    /// Relative strength in the blend.
    #[serde(with = "weight_serde")]
    pub weight: f64,
    /// Where this segment came from in the input.
    #[serde(skip)]
    pub span: PromptSpan,
}

impl SubPrompt {
    /// Create a sub-prompt with no source span (e.g. built by hand).
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
            span: PromptSpan::default(),
        }
    }

    /// Attach the byte spans this segment was scanned from.
    pub fn with_span(mut self, span: PromptSpan) -> Self {
        self.span = span;
        self
    }
}

/// JSON has no literal for non-finite numbers, so `inf`, `-inf` and `NaN`
/// travel as strings. Finite weights stay plain numbers.
mod weight_serde {
    use serde::de::{self, Deserializer, Visitor};
    use serde::ser::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(weight: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if weight.is_finite() {
            serializer.serialize_f64(*weight)
        } else if weight.is_nan() {
            serializer.serialize_str("NaN")
        } else if weight.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(WeightVisitor)
    }

    struct WeightVisitor;

    impl Visitor<'_> for WeightVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"inf\", \"-inf\", \"NaN\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

/// Byte ranges of the input consumed by one segment.
///
/// `text`, then a `:` at `text.end` when `weight_field` is present, then the
/// weight field, then the separating space at `separator`. The spans of all
/// segments tile the input with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSpan {
    pub text: Range<usize>,
    pub weight_field: Option<Range<usize>>,
    pub separator: Option<usize>,
}

impl PromptSpan {
    /// Byte offset one past the last byte this segment consumed.
    pub fn end(&self) -> usize {
        match (&self.weight_field, self.separator) {
            (_, Some(sep)) => sep + 1,
            (Some(field), None) => field.end,
            (None, None) => self.text.end,
        }
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────

/// A weight field that could not be parsed and was replaced by
/// [`DEFAULT_WEIGHT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightDiagnostic {
    /// The unparsable substring.
    pub field: String,
    /// Byte offset of the field within the input.
    pub offset: usize,
}

impl std::fmt::Display for WeightDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' (at byte {}) is not a value, are you missing a space? using weight {}",
            self.field, self.offset, DEFAULT_WEIGHT
        )
    }
}

// ── WeightedPrompt ────────────────────────────────────────────────────────

/// The ordered output of [`tokenize`](crate::tokenize).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedPrompt {
    /// Sub-prompts in input order.
    pub subprompts: Vec<SubPrompt>,
    /// Weight fields that fell back to the default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<WeightDiagnostic>,
}

impl WeightedPrompt {
    pub(crate) fn push(&mut self, subprompt: SubPrompt) {
        self.subprompts.push(subprompt);
    }

    /// Number of sub-prompts.
    pub fn len(&self) -> usize {
        self.subprompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subprompts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubPrompt> {
        self.subprompts.iter()
    }

    /// Sub-prompt texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.subprompts.iter().map(|s| s.text.as_str()).collect()
    }

    /// Weights in order, parallel to [`texts`](Self::texts).
    pub fn weights(&self) -> Vec<f64> {
        self.subprompts.iter().map(|s| s.weight).collect()
    }

    /// Sum of all weights. No normalization is applied anywhere; this is
    /// for callers that want to normalize themselves.
    pub fn total_weight(&self) -> f64 {
        self.subprompts.iter().map(|s| s.weight).sum()
    }

    /// Whether any weight field fell back to the default.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Split into the two parallel sequences consumed by the blend stage.
    pub fn into_parts(self) -> (Vec<String>, Vec<f64>) {
        self.subprompts
            .into_iter()
            .map(|s| (s.text, s.weight))
            .unzip()
    }

    /// Rejoin as `text:weight ` pairs, which tokenizes back to the same texts.
    pub fn to_prompt_string(&self) -> String {
        self.subprompts
            .iter()
            .map(|s| format!("{}:{} ", s.text, s.weight))
            .collect()
    }
}

impl<'a> IntoIterator for &'a WeightedPrompt {
    type Item = &'a SubPrompt;
    type IntoIter = std::slice::Iter<'a, SubPrompt>;

    fn into_iter(self) -> Self::IntoIter {
        self.subprompts.iter()
    }
}
