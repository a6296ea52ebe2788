//! `consult serve`: Line-delimited JSON tool calls over stdio.
//!
//! Each input line is one [`ToolCall`]; each output line is the matching
//! response tagged with the call's `id`. Requests are handled one at a
//! time. A malformed line gets an error reply and the loop keeps going.

use consult_core::tool::{ToolCall, ToolRegistry, ToolResponse};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::{build_registry, load_config};

#[derive(Debug, Serialize)]
struct Reply {
    id: String,
    #[serde(flatten)]
    response: ToolResponse,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let registry = build_registry(&config);
    info!(tools = ?registry.names(), "Serving tool calls on stdio");

    let handled = serve(&registry, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!(handled, "Input closed, shutting down");
    Ok(())
}

/// Answer calls until the reader hits EOF. Returns the number of replies.
async fn serve<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => {
                debug!(id = %call.id, tool = %call.name, "Tool call received");
                Reply {
                    id: call.id.clone(),
                    response: registry.dispatch(&call).await,
                }
            }
            Err(e) => {
                warn!(error = %e, "Malformed tool call");
                Reply {
                    id: String::new(),
                    response: ToolResponse::error(format!("Malformed tool call: {e}")),
                }
            }
        };

        let mut encoded = serde_json::to_string(&reply)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
