//! `consult ask`: One prompt, one answer.

use consult_core::EngineKind;
use consult_core::tool::ToolCall;

use super::{build_registry, load_config};

pub async fn run(
    engine: Option<EngineKind>,
    role: String,
    model: Option<String>,
    files: Vec<String>,
    prompt: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let engine = engine.unwrap_or(config.default_engine);
    let registry = build_registry(&config);

    let mut arguments = serde_json::json!({
        "prompt": prompt,
        "agent_role": role,
        "context_files": files,
    });
    if let Some(model) = model {
        arguments["model"] = serde_json::Value::String(model);
    }

    let call = ToolCall {
        id: "cli".into(),
        name: engine.tool_name().into(),
        arguments,
    };

    let response = registry.dispatch(&call).await;
    if response.is_error {
        return Err(response.text_content().into());
    }

    println!("{}", response.text_content());
    Ok(())
}
