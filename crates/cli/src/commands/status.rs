//! `consult status`: Show the effective configuration.

use consult_config::ConsultConfig;
use consult_core::EngineKind;

use super::load_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    println!("Consult Status");
    println!("==============");
    println!("  Config dir:     {}", ConsultConfig::config_dir().display());
    println!("  Default engine: {}", config.default_engine);
    println!("  Timeout:        {}ms", config.timeout_ms());
    println!("  Max files:      {}", config.max_context_files);
    println!("  Working dir:    {}", config.working_dir().display());
    println!(
        "  Prompts dir:    {}",
        config
            .prompts_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(built-in personas)".into())
    );
    for kind in EngineKind::ALL {
        let engine = config.engine(kind);
        println!("  {:<15} {} (model: {})", format!("{kind}:"), engine.binary, engine.default_model);
    }

    let config_path = ConsultConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, using defaults. Example:\n");
        println!("{}", ConsultConfig::default_toml());
    }

    Ok(())
}
