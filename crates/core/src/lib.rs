//! # subprompt core
//!
//! Splits a free-form prompt such as `"a castle:1.5 fog:0.3 oil painting"`
//! into ordered `(sub-prompt, weight)` pairs for a downstream conditioning
//! blend. This crate has no I/O; it only defines the domain model and the
//! tokenizer that the other crates build on.
//!
//! ```
//! use subprompt_core::tokenize;
//!
//! let parsed = tokenize("a cat:0.5 a dog:1.5");
//! assert_eq!(parsed.texts(), vec!["a cat", "a dog"]);
//! assert_eq!(parsed.weights(), vec![0.5, 1.5]);
//! ```

pub mod error;
pub mod prompt;
pub mod tokenizer;

pub use error::{BoxError, Error, Result, WeightParseError};
pub use prompt::{DEFAULT_WEIGHT, PromptSpan, SubPrompt, WeightDiagnostic, WeightedPrompt};
pub use tokenizer::{parse_weight, split_weighted_subprompts, tokenize};
