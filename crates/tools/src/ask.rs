//! Ask tools: one advisory request to an external engine.
//!
//! Validates the role and model, checks that the engine is installed,
//! assembles file context, composes the prompt, runs the engine once and
//! returns its extracted answer. Every stage can short-circuit into an
//! error response; nothing past the role check runs for a bad role.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use consult_config::ConsultConfig;
use consult_core::error::{Error, ToolError, ValidationError};
use consult_core::tool::{Tool, ToolResponse};
use consult_core::{AgentRole, EngineKind, validate_model};
use consult_engine::{Orchestrator, check_available, engine_command, extract_text};
use serde_json::Value;
use tracing::{debug, info};

use crate::context::ContextAssembler;
use crate::prompt::{compose, system_instructions};

/// A parsed ask request.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub prompt: String,
    pub agent_role: String,
    pub model: Option<String>,
    pub context_files: Vec<Value>,
}

impl AskRequest {
    /// Pull the request out of raw tool arguments.
    ///
    /// Only structural problems are errors here; the content of each field
    /// is validated by the pipeline.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ToolError> {
        let prompt = arguments["prompt"].as_str().unwrap_or_default().to_string();
        let agent_role = arguments["agent_role"].as_str().unwrap_or_default().to_string();

        let model = match &arguments["model"] {
            Value::Null => None,
            Value::String(model) => Some(model.clone()),
            _ => return Err(ToolError::InvalidArguments("'model' must be a string".into())),
        };

        let context_files = match &arguments["context_files"] {
            Value::Null => Vec::new(),
            Value::Array(files) => files.clone(),
            _ => {
                return Err(ToolError::InvalidArguments(
                    "'context_files' must be an array of paths".into(),
                ));
            }
        };

        Ok(Self {
            prompt,
            agent_role,
            model,
            context_files,
        })
    }
}

/// Advisory tool backed by one engine.
pub struct AskEngineTool {
    kind: EngineKind,
    description: String,
    binary: String,
    default_model: String,
    prompts_dir: Option<PathBuf>,
    max_context_files: usize,
    assembler: ContextAssembler,
    orchestrator: Arc<Orchestrator>,
}

impl AskEngineTool {
    pub fn new(kind: EngineKind, config: &ConsultConfig, orchestrator: Arc<Orchestrator>) -> Self {
        let engine = config.engine(kind);
        Self {
            kind,
            description: format!(
                "Send a prompt to the {kind} CLI under an advisory agent role \
                 ({}) and return its answer. Optional context files are \
                 inlined into the prompt.",
                AgentRole::valid_list()
            ),
            binary: engine.binary.clone(),
            default_model: engine.default_model.clone(),
            prompts_dir: config.prompts_dir.clone(),
            max_context_files: config.max_context_files,
            assembler: ContextAssembler::new(config.working_dir(), config.max_context_files),
            orchestrator,
        }
    }

    pub fn engine(&self) -> EngineKind {
        self.kind
    }

    /// Run the full pipeline for one request.
    pub async fn ask(&self, request: &AskRequest) -> Result<String, Error> {
        let role = AgentRole::parse(&request.agent_role)?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());
        validate_model(model)?;

        if request.prompt.trim().is_empty() {
            return Err(ValidationError::MissingArgument("prompt").into());
        }
        self.assembler.check_count(request.context_files.len())?;

        let program = check_available(self.orchestrator.launcher().as_ref(), self.kind, &self.binary)?;

        let file_context = self.assembler.assemble(&request.context_files).await?;
        let system = system_instructions(role, self.prompts_dir.as_deref());
        let prompt = compose(&request.prompt, file_context.as_deref(), &system);

        info!(
            engine = %self.kind,
            role = %role,
            model = %model,
            context_files = request.context_files.len(),
            "Dispatching ask request"
        );

        let command = engine_command(self.kind, program, model);
        let raw = self.orchestrator.invoke(&command, prompt.as_str()).await?;
        let text = extract_text(&raw);
        debug!(engine = %self.kind, raw_bytes = raw.len(), text_bytes = text.len(), "Parsed engine output");
        Ok(text)
    }
}

#[async_trait]
impl Tool for AskEngineTool {
    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        let roles: Vec<&str> = AgentRole::ALL.iter().map(|r| r.as_str()).collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The question or task for the engine"
                },
                "agent_role": {
                    "type": "string",
                    "enum": roles,
                    "description": "Advisory persona to run under"
                },
                "model": {
                    "type": "string",
                    "description": format!("Model override (default: {})", self.default_model)
                },
                "context_files": {
                    "type": "array",
                    "items": { "type": "string" },
                    "maxItems": self.max_context_files,
                    "description": "Files to inline into the prompt"
                }
            },
            "required": ["prompt", "agent_role"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResponse, ToolError> {
        let request = AskRequest::from_arguments(&arguments)?;
        Ok(ToolResponse::from_result(self.ask(&request).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_core::process::ProcessExit;
    use consult_engine::scripted::{Script, ScriptedLauncher};
    use serde_json::json;
    use std::time::Duration;

    fn tool(kind: EngineKind, launcher: &Arc<ScriptedLauncher>, config: &ConsultConfig) -> AskEngineTool {
        let orchestrator = Arc::new(Orchestrator::new(launcher.clone(), config.timeout()));
        AskEngineTool::new(kind, config, orchestrator)
    }

    fn ok_exit(stdout: &str) -> Script {
        Script::Exit(ProcessExit {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        })
    }

    #[tokio::test]
    async fn invalid_role_never_spawns() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("unused")));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());

        let response = tool
            .execute(json!({"prompt": "do it", "agent_role": "executor"}))
            .await
            .unwrap();

        assert!(response.is_error);
        let text = response.text_content();
        assert!(text.contains("executor"));
        assert!(text.contains("code-reviewer"));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn missing_role_is_rejected() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("unused")));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let response = tool.execute(json!({"prompt": "x"})).await.unwrap();
        assert!(response.is_error);
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn too_many_files_rejected_without_spawn() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("unused")));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let files: Vec<String> = (0..21).map(|i| format!("f{i}.rs")).collect();

        let response = tool
            .execute(json!({"prompt": "x", "agent_role": "planner", "context_files": files}))
            .await
            .unwrap();

        assert!(response.is_error);
        assert!(response.text_content().contains("Too many context files"));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn injected_model_rejected() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("unused")));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let response = tool
            .execute(json!({"prompt": "x", "agent_role": "critic", "model": "--sandbox=off"}))
            .await
            .unwrap();
        assert!(response.is_error);
        assert!(response.text_content().contains("Invalid model name"));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn unavailable_engine_reports_install_hint() {
        let launcher = Arc::new(ScriptedLauncher::new(Script::Missing));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let response = tool
            .execute(json!({"prompt": "x", "agent_role": "analyst"}))
            .await
            .unwrap();
        assert!(response.is_error);
        assert!(response.text_content().contains("npm install -g @openai/codex"));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn end_to_end_with_context_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "pub fn f() {}\n").unwrap();
        let config = ConsultConfig {
            working_dir: Some(dir.path().to_path_buf()),
            ..ConsultConfig::default()
        };
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit(
            "{\"type\":\"message\",\"content\":\"Looks fine.\"}\n",
        )));
        let tool = tool(EngineKind::Codex, &launcher, &config);

        let response = tool
            .execute(json!({
                "prompt": "Review this.",
                "agent_role": "code-reviewer",
                "model": "o3",
                "context_files": ["lib.rs"]
            }))
            .await
            .unwrap();

        assert!(!response.is_error);
        assert_eq!(response.text_content(), "Looks fine.");

        let command = launcher.last_command().unwrap();
        assert_eq!(command.args, ["exec", "-m", "o3", "--json", "--full-auto"]);

        let input = launcher.received_input();
        let system = system_instructions(AgentRole::CodeReviewer, None);
        assert_eq!(
            input,
            format!("{system}\n\n--- File: lib.rs ---\npub fn f() {{}}\n\n\nReview this.")
        );
    }

    #[tokio::test]
    async fn default_model_used_when_absent() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("plain answer")));
        let tool = tool(EngineKind::Gemini, &launcher, &ConsultConfig::default());
        let response = tool
            .execute(json!({"prompt": "Plan it.", "agent_role": "planner"}))
            .await
            .unwrap();

        assert_eq!(response.text_content(), "plain answer");
        assert_eq!(
            launcher.last_command().unwrap().args,
            ["--model", "gemini-2.5-pro", "--yolo"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_error_response() {
        let launcher = Arc::new(ScriptedLauncher::new(Script::Hang));
        let config = ConsultConfig {
            timeout_ms: 5_000,
            ..ConsultConfig::default()
        };
        let tool = tool(EngineKind::Codex, &launcher, &config);
        let response = tool
            .execute(json!({"prompt": "x", "agent_role": "architect"}))
            .await
            .unwrap();
        assert!(response.is_error);
        assert_eq!(response.text_content(), "Engine timed out after 5000ms");
        assert_eq!(launcher.kills(), 1);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn malformed_context_files_is_dispatch_error() {
        let launcher = Arc::new(ScriptedLauncher::new(ok_exit("unused")));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let result = tool
            .execute(json!({"prompt": "x", "agent_role": "critic", "context_files": "a.rs"}))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn schema_lists_roles() {
        let launcher = Arc::new(ScriptedLauncher::new(Script::Hang));
        let tool = tool(EngineKind::Codex, &launcher, &ConsultConfig::default());
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], json!(["prompt", "agent_role"]));
        assert_eq!(schema["properties"]["agent_role"]["enum"][4], "code-reviewer");
        assert_eq!(schema["properties"]["context_files"]["maxItems"], 20);
        assert_eq!(tool.name(), "ask_codex");
    }
}
