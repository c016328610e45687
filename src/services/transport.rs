//! Streaming Transport Adapter
//!
//! WebSocket server that accepts analysis commands and streams the
//! orchestrator's steps back to the client, one frame per step in emission
//! order. A fresh orchestrator is constructed per command; a per-connection
//! cancellation token (with one child per run) ensures a disconnect does not
//! leave orphaned model calls running.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

use picos_core::{ClientCommand, PolicyTable, ServerEvent};
use picos_llm::{build_gateway, LlmGateway};

use crate::config::AppConfig;
use crate::services::orchestrator::Orchestrator;
use crate::utils::error::{AppError, AppResult};

type WsWriter = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Shared server dependencies. One instance serves all connections.
pub struct ServerState {
    pub config: AppConfig,
    pub gateway: Arc<dyn LlmGateway>,
    pub policies: Arc<PolicyTable>,
}

impl ServerState {
    pub fn new(config: AppConfig) -> Self {
        let gateway = build_gateway(&config.gateway);
        Self {
            config,
            gateway,
            policies: Arc::new(PolicyTable::standard()),
        }
    }
}

/// Accept loop. Each connection is handled on its own task.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> AppResult<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            tracing::info!(%peer, "client connected");
            if let Err(err) = handle_connection(stream, state).await {
                tracing::warn!(%peer, error = %err, "connection ended with error");
            }
            tracing::info!(%peer, "client disconnected");
        });
    }
}

async fn handle_connection(stream: TcpStream, state: Arc<ServerState>) -> AppResult<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut writer, mut reader) = ws.split();
    let connection_cancel = CancellationToken::new();
    // Cancels any in-flight run when the connection handler returns.
    let _drop_guard = connection_cancel.clone().drop_guard();

    while let Some(message) = reader.next().await {
        match message? {
            Message::Text(text) => match ClientCommand::parse(&text) {
                Ok(command) => {
                    drive_run(&mut writer, &state, command, &connection_cancel).await?;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "rejecting malformed command");
                    send_event(&mut writer, &ServerEvent::error("Failed to process request"))
                        .await?;
                }
            },
            Message::Close(_) => break,
            Message::Ping(payload) => writer.send(Message::Pong(payload)).await?,
            _ => {}
        }
    }
    Ok(())
}

/// Run one command to completion, forwarding every step as a frame before
/// the orchestrator produces the next one. A failed write cancels the run.
async fn drive_run(
    writer: &mut WsWriter,
    state: &ServerState,
    command: ClientCommand,
    connection_cancel: &CancellationToken,
) -> AppResult<()> {
    let (record, images, rewrite_only) = match command {
        ClientCommand::AnalyzeRecord { record_data, images } => (record_data, images, false),
        ClientCommand::AnalyzeExecutionDetails { record_data, images } => {
            (record_data, images, true)
        }
    };

    // Capacity 1 keeps the orchestrator in lockstep with frame delivery.
    let (tx, mut rx) = mpsc::channel(1);
    let cancel = connection_cancel.child_token();
    let orchestrator = Orchestrator::new(
        state.gateway.clone(),
        state.policies.clone(),
        &state.config.analysis,
        tx,
        cancel.clone(),
    );
    let run = tokio::spawn(async move {
        if rewrite_only {
            orchestrator
                .analyze_execution_details(&record, &images)
                .await;
        } else {
            orchestrator.analyze_record(&record, &images).await;
        }
    });

    let delay = Duration::from_millis(state.config.server.step_delay_ms);
    while let Some(step) = rx.recv().await {
        if let Err(err) = send_event(writer, &ServerEvent::from(step)).await {
            cancel.cancel();
            let _ = run.await;
            return Err(err);
        }
        // Cosmetic pacing so the client can render progress incrementally.
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    let _ = run.await;
    Ok(())
}

async fn send_event(writer: &mut WsWriter, event: &ServerEvent) -> AppResult<()> {
    let frame = serde_json::to_string(event)?;
    writer
        .send(Message::Text(frame))
        .await
        .map_err(AppError::from)
}
