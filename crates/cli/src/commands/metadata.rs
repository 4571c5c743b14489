//! `subprompt metadata` — print the PNG text chunks and EXIF tags for a run.

use clap::Args;
use subprompt_config::AppConfig;
use subprompt_core::{Result, tokenize};
use subprompt_metadata::{GenerationParams, ImageMetadata, MetadataBuilder, MetadataError};

#[derive(Args)]
pub struct MetadataArgs {
    /// The full prompt
    prompt: String,

    #[arg(long)]
    seed: u64,

    #[arg(long, default_value_t = 50)]
    steps: u32,

    #[arg(long, default_value = "plms")]
    sampler: String,

    #[arg(long, default_value_t = 7.5)]
    scale: f64,

    #[arg(long)]
    full_precision: bool,

    #[arg(long, default_value_t = 1)]
    batch_size: u32,

    #[arg(long, default_value_t = 0)]
    batch_index: u32,

    /// Include the tokenized sub-prompts as a JSON text chunk
    #[arg(long)]
    subprompts: bool,
}

impl MetadataArgs {
    fn params(&self) -> GenerationParams {
        GenerationParams {
            seed: self.seed,
            prompt: self.prompt.clone(),
            steps: self.steps,
            sampler: self.sampler.clone(),
            scale: self.scale,
            full_precision: self.full_precision,
            batch_size: self.batch_size,
            batch_index: self.batch_index,
        }
    }
}

pub fn run(config: &AppConfig, args: MetadataArgs) -> Result<()> {
    let meta = build(config, &args)?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}

fn build(
    config: &AppConfig,
    args: &MetadataArgs,
) -> std::result::Result<ImageMetadata, MetadataError> {
    let mut builder =
        MetadataBuilder::new(&config.metadata.software, &config.metadata.script_name)
            .compress_prompt(config.metadata.compress_prompt);
    if args.subprompts {
        builder = builder.with_weighted_prompt(&tokenize(&args.prompt));
    }
    builder.build(&args.params())
}
