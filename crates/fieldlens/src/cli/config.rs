//! The `fieldlens config` command for configuration management.
//!
//! `show` prints the effective configuration with literal API keys redacted;
//! `init` seeds a default config file and points at the env vars each
//! provider needs.

use clap::{Args, Subcommand};
use fieldlens_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (API keys redacted)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = redact_keys(Config::load()?);
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let config = Config::default();
            std::fs::write(&path, config.to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!(
                "\nActive provider: {} (set [identify].provider to switch)",
                config.identify.provider
            );
            println!(
                "Before running `fieldlens identify`, export the key for your provider:\n\
                 \x20 gemini     GEMINI_API_KEY\n\
                 \x20 openai     OPENAI_API_KEY\n\
                 \x20 replicate  REPLICATE_API_TOKEN"
            );
        }
    }

    Ok(())
}

/// Replace literal API keys with a placeholder before printing.
///
/// `${ENV_VAR}` references are kept as-is — they are instructions, not
/// secrets. Only keys pasted directly into the file are hidden.
fn redact_keys(mut config: Config) -> Config {
    if let Some(gemini) = config.providers.gemini.as_mut() {
        gemini.api_key = redact(&gemini.api_key);
    }
    if let Some(openai) = config.providers.openai.as_mut() {
        openai.api_key = redact(&openai.api_key);
    }
    if let Some(replicate) = config.providers.replicate.as_mut() {
        replicate.api_key = redact(&replicate.api_key);
    }
    config
}

fn redact(key: &str) -> String {
    if key.is_empty() || (key.starts_with("${") && key.ends_with('}')) {
        key.to_string()
    } else {
        "[redacted]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldlens_core::config::{GeminiConfig, OpenAiConfig};

    #[test]
    fn test_redact_hides_literal_keys() {
        assert_eq!(redact("sk-live-abc123"), "[redacted]");
    }

    #[test]
    fn test_redact_keeps_env_references_and_empty() {
        assert_eq!(redact("${GEMINI_API_KEY}"), "${GEMINI_API_KEY}");
        assert_eq!(redact(""), "");
    }

    #[test]
    fn test_redact_keys_walks_all_providers() {
        let mut config = Config::default();
        config.providers.gemini = Some(GeminiConfig {
            api_key: "AIza-literal".to_string(),
            model: "gemini-2.0-flash".to_string(),
        });
        config.providers.openai = Some(OpenAiConfig {
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        });

        let redacted = redact_keys(config);
        assert_eq!(redacted.providers.gemini.unwrap().api_key, "[redacted]");
        assert_eq!(
            redacted.providers.openai.unwrap().api_key,
            "${OPENAI_API_KEY}"
        );
    }

    #[test]
    fn test_show_output_never_leaks_literal_key() {
        let mut config = Config::default();
        config.providers.gemini = Some(GeminiConfig {
            api_key: "AIza-secret-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
        });
        let toml = redact_keys(config).to_toml().unwrap();
        assert!(!toml.contains("AIza-secret-key"));
        assert!(toml.contains("[redacted]"));
    }
}
