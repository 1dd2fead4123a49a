//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use futures::{SinkExt, StreamExt, future};

use relayhub_core::error::AppError;
use relayhub_core::types::Identity;
use relayhub_realtime::connection::{ClientFrame, ConnectionSupervisor, ServerFrame, bearer_token};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer token; the `Authorization` header is used when absent.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}: WebSocket upgrade.
///
/// The token is checked before the upgrade so a bad token gets a plain 401.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    let token = query.token.as_deref().or(header_token);

    let supervisor = state.realtime.supervisor().clone();
    let identity = supervisor.authenticate(token)?;

    let ws = ws.map_err(|e| AppError::validation(e.body_text()))?;
    Ok(ws.on_upgrade(move |socket| handle_socket(supervisor, identity, socket)))
}

/// Adapts the socket to hub frames and hands it to the supervisor.
async fn handle_socket(supervisor: ConnectionSupervisor, identity: Identity, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let inbound = stream.map(|result| result.map(client_frame));
    let outbound = sink.with(|frame: ServerFrame| future::ready(Ok::<_, axum::Error>(ws_message(frame))));

    supervisor.run(identity, inbound, outbound).await;
}

fn client_frame(message: Message) -> ClientFrame {
    match message {
        Message::Text(text) => ClientFrame::Text(text.as_str().to_owned()),
        Message::Binary(data) => ClientFrame::Binary(data.to_vec()),
        Message::Ping(_) => ClientFrame::Ping,
        Message::Pong(_) => ClientFrame::Pong,
        Message::Close(_) => ClientFrame::Close,
    }
}

fn ws_message(frame: ServerFrame) -> Message {
    match frame {
        ServerFrame::Text(json) => Message::Text(json.to_string().into()),
        ServerFrame::Ping => Message::Ping(Default::default()),
        ServerFrame::Close => Message::Close(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_mapping() {
        assert_eq!(
            client_frame(Message::Text(String::from("{}").into())),
            ClientFrame::Text("{}".to_string())
        );
        assert_eq!(client_frame(Message::Close(None)), ClientFrame::Close);
        assert_eq!(client_frame(Message::Pong(Default::default())), ClientFrame::Pong);

        assert!(matches!(ws_message(ServerFrame::Ping), Message::Ping(_)));
        assert!(matches!(ws_message(ServerFrame::Close), Message::Close(None)));
        match ws_message(ServerFrame::Text("{\"a\":1}".into())) {
            Message::Text(text) => assert_eq!(text.as_str(), "{\"a\":1}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
