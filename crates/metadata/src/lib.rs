//! Image metadata for generated images.
//!
//! Builds the PNG text chunks and EXIF tags that describe a generation run
//! (seed, prompt, sampler settings, …). This crate only produces the
//! records; writing them into an image file is left to the image pipeline.

mod builder;
mod model;

pub use builder::{MetadataBuilder, SUBPROMPTS_KEYWORD};
pub use model::{GenerationParams, ImageMetadata, TextChunk, exif_tag};

/// Errors from the metadata builder.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid text chunk keyword '{keyword}': {reason}")]
    InvalidKeyword { keyword: String, reason: String },

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl From<MetadataError> for subprompt_core::Error {
    fn from(e: MetadataError) -> Self {
        subprompt_core::Error::Metadata(Box::new(e))
    }
}
