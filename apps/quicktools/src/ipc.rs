//! # JSON-Lines IPC
//!
//! One request per input line, one response per output line.
//!
//! ## Wire Format
//! ```text
//! request:  {"id": 1, "command": "round_number", "args": {...}}
//! success:  {"id": 1, "ok": true,  "data": {...}}
//! failure:  {"id": 1, "ok": false, "error": {"code": "...", "message": "..."}}
//! ```
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reader loop ──► line ──► commands::start (in arrival order)            │
//! │       │                       │                                         │
//! │       │          Done ────────┼──────────────────────────┐              │
//! │       │          Pending ──► tokio::spawn(run) ──────────┼──► mpsc ──►  │
//! │       │          Pending ──► tokio::spawn(run) ──────────┘   writer     │
//! │       ▼                                                        │        │
//! │     EOF: stop reading, wait for in-flight requests             ▼        │
//! │                                                             stdout      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! State changes (calculator keys, histories, render tokens) happen in the
//! reader loop, so they apply in the order the lines arrive. Only file and
//! render work runs concurrently, which means responses can come back in a
//! different order than the requests; clients match them by `id`.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::commands::{self, Request, Started};
use crate::error::ApiError;
use crate::state::AppState;

/// Responses buffered between request tasks and the writer.
const RESPONSE_BUFFER: usize = 64;

/// One response line.
#[derive(Debug, Serialize)]
pub struct Response {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn new(id: Value, result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Response {
                id,
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Response {
                id,
                ok: false,
                data: None,
                error: Some(err),
            },
        }
    }
}

/// Serves requests from `reader` until EOF, writing responses to `writer`.
///
/// Returns once every in-flight request has been answered.
pub async fn serve<R, W>(reader: R, writer: W, state: AppState) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Response>(RESPONSE_BUFFER);
    let writer_task = tokio::spawn(write_responses(rx, writer));

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let (id, request) = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(response) => {
                send(&tx, response).await;
                continue;
            }
        };

        let command = request.name();
        match commands::start(&state, request) {
            Started::Done(result) => send(&tx, finish(command, id, result)).await,
            Started::Pending(pending) => {
                let state = state.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = pending.run(&state).await;
                    send(&tx, finish(command, id, result)).await;
                });
            }
        }
    }

    info!("Input closed, finishing in-flight requests");
    // The writer ends when the last sender, including the ones held by
    // request tasks, is dropped.
    drop(tx);
    writer_task.await??;
    Ok(())
}

async fn write_responses<W>(mut rx: mpsc::Receiver<Response>, mut writer: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_vec(&response) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                continue;
            }
        };
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn send(tx: &mpsc::Sender<Response>, response: Response) {
    if tx.send(response).await.is_err() {
        error!("Response writer stopped, dropping response");
    }
}

/// Parses one request line, or answers it with BAD_REQUEST.
fn parse_line(line: &str) -> Result<(Value, Request), Response> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        Response::new(Value::Null, Err(ApiError::bad_request(format!("Invalid JSON: {}", e))))
    })?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    match serde_json::from_value::<Request>(value) {
        Ok(request) => Ok((id, request)),
        Err(e) => Err(Response::new(id, Err(ApiError::bad_request(format!("Invalid request: {}", e))))),
    }
}

fn finish(command: &str, id: Value, result: Result<Value, ApiError>) -> Response {
    match &result {
        Ok(_) => debug!(command, %id, "Request completed"),
        Err(err) => debug!(command, %id, code = ?err.code, "Request failed"),
    }
    Response::new(id, result)
}
