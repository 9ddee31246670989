//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::GameError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "historle_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "historle_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => handle_client_ws(incoming, &state).await,
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "historle_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => {
        if let Err(e) = socket.send(Message::Pong(payload)).await {
          error!(target: "historle_backend", error = %e, "WS pong send error");
          break;
        }
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "historle_backend", "WebSocket disconnected");
}

fn ws_error(e: GameError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip_all)]
pub(crate) async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Start { player } => match logic::start_game(state, player.as_deref()).await {
      Ok(session) => {
        debug!(target: "puzzle", session = %session.session_id, "WS session started");
        ServerWsMessage::Session { session }
      }
      Err(e) => ws_error(e),
    },

    ClientWsMessage::Guess { session_id, guess } => logic::submit_guess(state, &session_id, &guess)
      .await
      .map(|result| ServerWsMessage::GuessResult { result })
      .unwrap_or_else(ws_error),

    ClientWsMessage::Reveal { session_id } => logic::reveal(state, &session_id)
      .await
      .map(|reveal| ServerWsMessage::Reveal { reveal })
      .unwrap_or_else(ws_error),

    ClientWsMessage::Finish { session_id, name } => logic::finish(state, &session_id, name.as_deref())
      .await
      .map(|summary| ServerWsMessage::Finished { summary })
      .unwrap_or_else(ws_error),

    ClientWsMessage::Share { session_id } => logic::share(state, &session_id)
      .await
      .map(|share| ServerWsMessage::Share { share })
      .unwrap_or_else(ws_error),

    ClientWsMessage::Stats { player } => logic::stats(state, &player)
      .await
      .map(|stats| ServerWsMessage::Stats { stats })
      .unwrap_or_else(ws_error),
  }
}
