//! Websocket progress streaming.

use crate::{ApiError, ApiState};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use narrata_core::{ProgressView, ProjectId};
use narrata_error::{NarrataError, PipelineError, PipelineErrorKind};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// `GET /ws/:id`
///
/// Sends the project's [`ProgressView`] as JSON text frames, once on
/// connect and then on every refresh, and closes after a terminal status.
#[instrument(skip(state, upgrade, id), fields(project_id = %id))]
pub async fn progress_socket(
    State(state): State<ApiState>,
    Path(id): Path<ProjectId>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let Some(rx) = state.progress().subscribe(&id) else {
        let err = PipelineError::new(PipelineErrorKind::ProjectNotFound(id.to_string()));
        return Err(NarrataError::from(err).into());
    };
    Ok(upgrade.on_upgrade(move |socket| stream_progress(socket, rx, id)))
}

async fn stream_progress(
    mut socket: WebSocket,
    mut rx: watch::Receiver<ProgressView>,
    id: ProjectId,
) {
    loop {
        let view = rx.borrow_and_update().clone();
        let terminal = view.status.is_terminal();
        let frame = match serde_json::to_string(&view) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(project_id = %id, error = %e, "Failed to encode progress");
                break;
            }
        };
        if socket.send(Message::Text(frame)).await.is_err() {
            debug!(project_id = %id, "Listener went away");
            return;
        }
        if terminal {
            break;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    debug!(project_id = %id, "Progress feed ended");
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}
