//! Assembles [`ImageMetadata`] from generation settings.

use crate::MetadataError;
use crate::model::{GenerationParams, ImageMetadata, TextChunk, exif_tag};
use subprompt_core::WeightedPrompt;

/// Keyword of the optional chunk carrying the tokenized prompt as JSON.
pub const SUBPROMPTS_KEYWORD: &str = "SubPrompts";

/// Builds the metadata records written alongside a generated image.
///
/// ```
/// use subprompt_metadata::{GenerationParams, MetadataBuilder, exif_tag};
///
/// let meta = MetadataBuilder::new("subprompt", "txt2img")
///     .build(&GenerationParams::new(42, "a cat"))
///     .unwrap();
/// assert_eq!(meta.text_chunk("Seed"), Some("42"));
/// assert_eq!(meta.exif_tag(exif_tag::IMAGE_DESCRIPTION), Some("a cat"));
/// ```
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    software: String,
    script_name: String,
    compress_prompt: bool,
    weighted: Option<WeightedPrompt>,
    extra: Vec<TextChunk>,
}

impl MetadataBuilder {
    pub fn new(software: impl Into<String>, script_name: impl Into<String>) -> Self {
        Self {
            software: software.into(),
            script_name: script_name.into(),
            compress_prompt: true,
            weighted: None,
            extra: Vec::new(),
        }
    }

    /// Whether the `Prompt` chunk is marked for compression (default: yes).
    pub fn compress_prompt(mut self, compress: bool) -> Self {
        self.compress_prompt = compress;
        self
    }

    /// Also record the tokenized sub-prompts as a JSON text chunk.
    pub fn with_weighted_prompt(mut self, weighted: &WeightedPrompt) -> Self {
        self.weighted = Some(weighted.clone());
        self
    }

    /// Append a custom text chunk after the standard ones.
    pub fn with_text_chunk(
        mut self,
        keyword: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        self.extra.push(TextChunk::new(keyword, text, false)?);
        Ok(self)
    }

    pub fn build(&self, params: &GenerationParams) -> Result<ImageMetadata, MetadataError> {
        let mut meta = ImageMetadata::default();

        let standard = [
            (
                "Software",
                format!("{}, {}", self.software, self.script_name),
                true,
            ),
            ("Seed", params.seed.to_string(), false),
            ("Prompt", params.prompt.clone(), self.compress_prompt),
            ("ddim_steps", params.steps.to_string(), false),
            ("sampler", params.sampler.clone(), false),
            ("Scale", params.scale.to_string(), false),
            ("FullPrecision", params.full_precision.to_string(), false),
            ("Batch Size", params.batch_size.to_string(), false),
            ("Batch Index", params.batch_index.to_string(), false),
        ];
        for (keyword, text, compressed) in standard {
            meta.text_chunks.push(TextChunk::new(keyword, text, compressed)?);
        }

        if let Some(weighted) = &self.weighted {
            let json = serde_json::to_string(weighted)?;
            meta.text_chunks.push(TextChunk::new(SUBPROMPTS_KEYWORD, json, true)?);
        }
        meta.text_chunks.extend(self.extra.iter().cloned());

        let summary = params.summary();
        meta.exif.insert(exif_tag::CUSTOM_RENDERED, "1".into());
        meta.exif.insert(exif_tag::DEVICE_SETTING_DESCRIPTION, summary.clone());
        meta.exif.insert(exif_tag::MAKER_NOTE, summary.clone());
        meta.exif.insert(exif_tag::USER_COMMENT, summary);
        meta.exif.insert(exif_tag::IMAGE_DESCRIPTION, params.prompt.clone());
        meta.exif.insert(
            exif_tag::SOFTWARE,
            format!("{} {}", self.software, self.script_name),
        );

        tracing::debug!(
            text_chunks = meta.text_chunks.len(),
            exif_tags = meta.exif.len(),
            "Image metadata built"
        );
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subprompt_core::tokenize;

    fn params() -> GenerationParams {
        GenerationParams {
            seed: 1234,
            prompt: "a castle:1.5 fog:0.3".into(),
            steps: 30,
            sampler: "ddim".into(),
            scale: 9.0,
            full_precision: true,
            batch_size: 4,
            batch_index: 2,
        }
    }

    #[test]
    fn standard_text_chunks_in_order() {
        let meta = MetadataBuilder::new("subprompt", "txt2img")
            .build(&params())
            .unwrap();
        let keywords: Vec<_> = meta
            .text_chunks
            .iter()
            .map(|c| c.keyword.as_str())
            .collect();
        assert_eq!(
            keywords,
            vec![
                "Software",
                "Seed",
                "Prompt",
                "ddim_steps",
                "sampler",
                "Scale",
                "FullPrecision",
                "Batch Size",
                "Batch Index",
            ]
        );
        assert_eq!(meta.text_chunk("Software"), Some("subprompt, txt2img"));
        assert_eq!(meta.text_chunk("Scale"), Some("9"));
        assert_eq!(meta.text_chunk("FullPrecision"), Some("true"));
        assert_eq!(meta.text_chunk("Batch Index"), Some("2"));
    }

    #[test]
    fn compression_flags() {
        let meta = MetadataBuilder::new("s", "x").build(&params()).unwrap();
        let compressed: Vec<_> = meta
            .text_chunks
            .iter()
            .filter(|c| c.compressed)
            .map(|c| c.keyword.as_str())
            .collect();
        assert_eq!(compressed, vec!["Software", "Prompt"]);

        let meta = MetadataBuilder::new("s", "x")
            .compress_prompt(false)
            .build(&params())
            .unwrap();
        assert!(
            !meta
                .text_chunks
                .iter()
                .any(|c| c.keyword == "Prompt" && c.compressed)
        );
    }

    #[test]
    fn exif_tags_carry_summary_and_prompt() {
        let p = params();
        let meta = MetadataBuilder::new("subprompt", "txt2img")
            .build(&p)
            .unwrap();
        let summary = p.summary();
        assert_eq!(meta.exif.len(), 6);
        assert_eq!(meta.exif_tag(exif_tag::CUSTOM_RENDERED), Some("1"));
        assert_eq!(
            meta.exif_tag(exif_tag::DEVICE_SETTING_DESCRIPTION),
            Some(summary.as_str())
        );
        assert_eq!(meta.exif_tag(exif_tag::MAKER_NOTE), Some(summary.as_str()));
        assert_eq!(meta.exif_tag(exif_tag::USER_COMMENT), Some(summary.as_str()));
        assert_eq!(
            meta.exif_tag(exif_tag::IMAGE_DESCRIPTION),
            Some("a castle:1.5 fog:0.3")
        );
        assert_eq!(
            meta.exif_tag(exif_tag::SOFTWARE),
            Some("subprompt txt2img")
        );
        assert!(summary.contains("precision: true"));
    }

    #[test]
    fn weighted_prompt_chunk_is_json() {
        let p = params();
        let meta = MetadataBuilder::new("s", "x")
            .with_weighted_prompt(&tokenize(&p.prompt))
            .build(&p)
            .unwrap();
        let json = meta.text_chunk(SUBPROMPTS_KEYWORD).unwrap();
        let parsed: WeightedPrompt = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.texts(), vec!["a castle", "fog"]);
        assert_eq!(parsed.weights(), vec![1.5, 0.3]);
    }

    #[test]
    fn weighted_prompt_chunk_keeps_infinite_weight() {
        let p = GenerationParams::new(1, "sun:inf moon");
        let meta = MetadataBuilder::new("s", "x")
            .with_weighted_prompt(&tokenize(&p.prompt))
            .build(&p)
            .unwrap();
        let json = meta.text_chunk(SUBPROMPTS_KEYWORD).unwrap();
        let parsed: WeightedPrompt = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.weights(), vec![f64::INFINITY, 1.0]);
    }

    #[test]
    fn custom_chunks_follow_standard_ones() {
        let meta = MetadataBuilder::new("s", "x")
            .with_text_chunk("Model", "v1-4")
            .unwrap()
            .build(&params())
            .unwrap();
        assert_eq!(meta.text_chunks.last().unwrap().keyword, "Model");
    }

    #[test]
    fn invalid_custom_keyword_rejected() {
        let result = MetadataBuilder::new("s", "x").with_text_chunk(" bad", "v");
        assert!(matches!(
            result,
            Err(MetadataError::InvalidKeyword { .. })
        ));
    }
}
