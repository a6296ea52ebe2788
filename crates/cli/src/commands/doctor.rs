//! `consult doctor`: Diagnose engine availability and configuration.

use consult_config::ConsultConfig;
use consult_core::EngineKind;
use consult_engine::{TokioLauncher, check_available};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Consult Doctor: System Diagnostics");
    println!("===================================\n");

    let mut issues = 0;

    let config = match ConsultConfig::load() {
        Ok(config) => {
            println!("  [ok]   Configuration valid");
            config
        }
        Err(e) => {
            println!("  [fail] Configuration invalid: {e}");
            issues += 1;
            ConsultConfig::default()
        }
    };

    for kind in EngineKind::ALL {
        let engine = config.engine(kind);
        match check_available(&TokioLauncher, kind, &engine.binary) {
            Ok(path) => println!("  [ok]   {kind} found at {path}"),
            Err(e) => {
                println!("  [warn] {e}");
                issues += 1;
            }
        }
    }

    if let Some(dir) = &config.prompts_dir {
        if dir.is_dir() {
            println!("  [ok]   Prompts directory {}", dir.display());
        } else {
            println!("  [warn] Prompts directory {} does not exist", dir.display());
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
