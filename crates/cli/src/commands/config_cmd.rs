//! `aide config` — Configuration management commands.

use aide_config::AideConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AideConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.api_key_provider().key().await.is_empty() {
                warnings.push("No API key available (set OPENAI_API_KEY, api_key or api_key_command)".to_string());
            }

            if config.max_output_tokens > 480 {
                warnings.push(format!(
                    "max_output_tokens = {} (responses tend to degrade above 480)",
                    config.max_output_tokens
                ));
            }

            let memory_path = config.memory_path();
            if config.memory.enabled && !memory_path.is_file() {
                warnings.push(format!("Memory file not found: {}", memory_path.display()));
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Endpoint:  {}", config.base_url);
            println!("   Model:     {}", config.model);
            println!(
                "   Budget:    {} input tokens (~{} chars), {} output tokens",
                config.max_input_tokens,
                config.max_prompt_chars(),
                config.max_output_tokens
            );
            println!(
                "   Memory:    {}",
                if config.memory.enabled {
                    memory_path.display().to_string()
                } else {
                    "disabled".into()
                }
            );
            println!(
                "   Chat log:  {}",
                config
                    .chat_log_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "disabled".into())
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AideConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", toml::to_string_pretty(&redacted(config))?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AideConfig::config_path().display());
    Ok(())
}

fn redacted(mut config: AideConfig) -> AideConfig {
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    config
}
