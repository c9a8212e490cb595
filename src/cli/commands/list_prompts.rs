//! List-prompts command implementation

use crate::cli::{exit_code, EXIT_CONFIGURATION};
use crate::config::load_config;
use crate::core::prompts::PromptStore;
use clap::Args;
use std::path::Path;

/// Arguments for the list-prompts command
#[derive(Args, Debug)]
pub struct ListPromptsArgs {}

impl ListPromptsArgs {
    /// Execute the list-prompts command
    ///
    /// Without a configuration file only the built-in variants are listed.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let variants_path = if Path::new(config_path).exists() {
            match load_config(config_path) {
                Ok(config) => config.prompts.variants_path,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIGURATION);
                }
            }
        } else {
            tracing::debug!(config_path = %config_path, "No configuration file, listing built-in prompts");
            None
        };

        let store = match PromptStore::load(variants_path.as_deref()) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        println!("📝 Available prompts ({}):", store.len());
        for variant in store.list() {
            let status = if variant.validate().is_ok() { "" } else { "  ⚠️  invalid template" };
            println!("  {:<10} {}{}", variant.id.as_str(), variant.description, status);
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_builtin_without_config() {
        let args = ListPromptsArgs {};
        assert_eq!(args.execute("/nonexistent/pii-eval.toml").await.unwrap(), 0);
    }
}
