//! Data model for generation parameters and the metadata records built
//! from them.

use crate::MetadataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EXIF tag numbers written by [`MetadataBuilder`](crate::MetadataBuilder).
pub mod exif_tag {
    pub const IMAGE_DESCRIPTION: u16 = 0x010E;
    pub const SOFTWARE: u16 = 0x0131;
    pub const MAKER_NOTE: u16 = 0x927C;
    pub const USER_COMMENT: u16 = 0x9286;
    pub const CUSTOM_RENDERED: u16 = 0xA401;
    pub const DEVICE_SETTING_DESCRIPTION: u16 = 0xA40B;
}

// ── GenerationParams ──────────────────────────────────────────────────────

/// Settings of one generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub seed: u64,
    pub prompt: String,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_sampler")]
    pub sampler: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub full_precision: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default)]
    pub batch_index: u32,
}

fn default_steps() -> u32 {
    50
}
fn default_sampler() -> String {
    "plms".into()
}
fn default_scale() -> f64 {
    7.5
}
fn default_batch_size() -> u32 {
    1
}

impl GenerationParams {
    pub fn new(seed: u64, prompt: impl Into<String>) -> Self {
        Self {
            seed,
            prompt: prompt.into(),
            steps: default_steps(),
            sampler: default_sampler(),
            scale: default_scale(),
            full_precision: false,
            batch_size: default_batch_size(),
            batch_index: 0,
        }
    }

    /// One-line description of every setting, prompt last.
    pub fn summary(&self) -> String {
        format!(
            "Seed: {}, ddim_steps: {}, sampler: {}, scale: {}, precision: {}, \
             batchsize: {}, batchindex: {}, prompt: {}",
            self.seed,
            self.steps,
            self.sampler,
            self.scale,
            self.full_precision,
            self.batch_size,
            self.batch_index,
            self.prompt
        )
    }
}

// ── TextChunk ─────────────────────────────────────────────────────────────

/// A PNG international text (`iTXt`) chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub keyword: String,
    pub text: String,
    /// Whether the chunk body should be zlib-compressed when written.
    pub compressed: bool,
}

impl TextChunk {
    /// Create a chunk, checking the keyword against the PNG rules:
    /// 1–79 Latin-1 printable characters, no leading, trailing, or
    /// consecutive spaces.
    pub fn new(
        keyword: impl Into<String>,
        text: impl Into<String>,
        compressed: bool,
    ) -> Result<Self, MetadataError> {
        let keyword = keyword.into();
        validate_keyword(&keyword)?;
        Ok(Self {
            keyword,
            text: text.into(),
            compressed,
        })
    }
}

fn validate_keyword(keyword: &str) -> Result<(), MetadataError> {
    let invalid = |reason: &str| MetadataError::InvalidKeyword {
        keyword: keyword.to_string(),
        reason: reason.to_string(),
    };

    let len = keyword.chars().count();
    if len == 0 || len > 79 {
        return Err(invalid("must be 1-79 characters"));
    }
    if keyword.starts_with(' ') || keyword.ends_with(' ') || keyword.contains("  ") {
        return Err(invalid("no leading, trailing, or consecutive spaces"));
    }
    let printable_latin1 = |c: char| matches!(c as u32, 0x20..=0x7E | 0xA1..=0xFF);
    if !keyword.chars().all(printable_latin1) {
        return Err(invalid("only printable Latin-1 characters are allowed"));
    }
    Ok(())
}

// ── ImageMetadata ─────────────────────────────────────────────────────────

/// Text chunks (in write order) and EXIF tags for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub text_chunks: Vec<TextChunk>,
    pub exif: BTreeMap<u16, String>,
}

impl ImageMetadata {
    /// Text of the first chunk with this keyword.
    pub fn text_chunk(&self, keyword: &str) -> Option<&str> {
        self.text_chunks
            .iter()
            .find(|c| c.keyword == keyword)
            .map(|c| c.text.as_str())
    }

    pub fn exif_tag(&self, tag: u16) -> Option<&str> {
        self.exif.get(&tag).map(String::as_str)
    }
}
