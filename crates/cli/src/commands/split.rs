//! `subprompt split` — tokenize a prompt and print the weighted sub-prompts.

use subprompt_config::AppConfig;
use subprompt_core::{Result, WeightedPrompt, tokenize};

pub fn run(config: &AppConfig, prompt: &str, json: bool) -> Result<()> {
    let weighted = tokenize(prompt);

    if json {
        println!("{}", serde_json::to_string_pretty(&weighted)?);
        return Ok(());
    }

    print!("{}", render_table(&weighted, config.tokenizer.warn_on_unparsable));
    Ok(())
}

/// Render sub-prompts as an aligned table, texts quoted so leading and
/// trailing spaces stay visible.
fn render_table(weighted: &WeightedPrompt, show_diagnostics: bool) -> String {
    let mut out = String::new();
    if weighted.is_empty() {
        out.push_str("No sub-prompts.\n");
        return out;
    }

    out.push_str(&format!("{:>3}  {:>8}  {}\n", "#", "Weight", "Sub-prompt"));
    out.push_str(&format!("{:>3}  {:>8}  {}\n", "─", "──────", "──────────"));
    for (i, sp) in weighted.iter().enumerate() {
        out.push_str(&format!("{:>3}  {:>8}  {:?}\n", i + 1, sp.weight, sp.text));
    }

    if show_diagnostics && weighted.has_diagnostics() {
        out.push('\n');
        for d in &weighted.diagnostics {
            out.push_str(&format!("⚠️  {d}\n"));
        }
    }
    out
}
