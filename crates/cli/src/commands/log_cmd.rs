//! `subprompt log` — append a tokenized run to the CSV run log.

use std::path::PathBuf;
use subprompt_config::AppConfig;
use subprompt_core::{Result, tokenize};
use subprompt_runlog::{RunLog, RunRecord};

pub fn run(
    config: &AppConfig,
    prompt: &str,
    params: Vec<(String, String)>,
    path: Option<PathBuf>,
) -> Result<()> {
    if path.is_none() && !config.run_log.enabled {
        println!("Run log is disabled (run_log.enabled = false); nothing written.");
        return Ok(());
    }

    let log = RunLog::new(path.unwrap_or_else(|| config.run_log.path.clone()));
    let record = build_record(prompt, params);
    let run_id = log.append(&record)?;

    println!("📝 Logged run {run_id} to {}", log.path().display());
    Ok(())
}

fn build_record(prompt: &str, params: Vec<(String, String)>) -> RunRecord {
    let mut record = RunRecord::from_prompt(prompt, &tokenize(prompt));
    for (key, value) in params {
        record.set(key, value);
    }
    record
}

/// Parse a `key=value` pair for `--param`.
pub fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
