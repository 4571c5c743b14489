//! `subprompt config` — Configuration management commands.

use std::path::Path;
use subprompt_config::AppConfig;
use subprompt_core::{Error, Result};

pub fn validate(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration at {}...", path.display());

    match AppConfig::load_with_env(path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Log level:  {}", config.log_level);
            println!(
                "   Run log:    {} ({})",
                config.run_log.path.display(),
                if config.run_log.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "   Software:   {} {}",
                config.metadata.software, config.metadata.script_name
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but are probably not what the user wants.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if config.run_log.path.extension().is_none_or(|ext| ext != "csv") {
        warnings.push("run_log.path does not end in .csv");
    }

    if config.metadata.software.trim().is_empty() {
        warnings.push("metadata.software is empty");
    }

    if !config.tokenizer.warn_on_unparsable {
        warnings.push("Unparsable weights will only be reported in logs");
    }

    warnings
}

pub fn show(config: &AppConfig) -> Result<()> {
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| Error::Internal(e.to_string()))?;
    println!("{toml_str}");
    Ok(())
}

pub fn init(path: &Path, write: bool) -> Result<()> {
    let toml_str = AppConfig::default_toml();
    if !write {
        println!("{toml_str}");
        return Ok(());
    }

    if path.exists() {
        return Err(Error::Config {
            message: format!("{} already exists; not overwriting", path.display()),
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml_str)?;
    println!("✅ Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_path();
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(warnings(&AppConfig::default()).is_empty());
    }

    #[test]
    fn odd_settings_warn() {
        let mut config = AppConfig::default();
        config.run_log.path = PathBuf::from("runs.txt");
        config.tokenizer.warn_on_unparsable = false;
        assert_eq!(warnings(&config).len(), 2);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        init(&path, true).unwrap();
        assert!(AppConfig::load_from(&path).is_ok());
        assert!(init(&path, true).is_err());
    }
}
