//! `aide init` — First-time setup.

use aide_config::AideConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AideConfig::config_dir();
    let config_path = AideConfig::config_path();

    println!("Aide — First-Time Setup");
    println!("=======================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AideConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set OPENAI_API_KEY, or add api_key / api_key_command to the config");
    println!("   2. Optionally enable [memory] and point it at your notes file");
    println!("   3. Run: echo 'Once upon a time' | aide complete -i 'continue the story'\n");

    Ok(())
}
