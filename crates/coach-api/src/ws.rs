//! WebSocket channel
//!
//! Frames are JSON envelopes `{"event": ..., "data": {...}}`. Events from one
//! connection are handled in order; separate connections run concurrently.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, State,
    },
    response::Response,
};
use serde::{Deserialize, Serialize};

use coach_core::{DebateTurn, FeedbackRecord};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Events a client may send
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    DebateMessage(DebateMessage),
    /// Keyword-matched replies for clients that predate structured debates
    ChatMessage(ChatMessage),
}

#[derive(Debug, Deserialize)]
pub struct DebateMessage {
    pub topic: Option<String>,
    pub position: Option<String>,
    pub message: Option<String>,
    pub message_count: Option<u32>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message: Option<String>,
}

/// Events the server emits
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    DebateFeedback { feedback: FeedbackRecord, fallback: bool },
    AiResponse { message: String },
    Error { message: String },
}

const LEGACY_REPLIES: &[(&str, &str)] = &[
    (
        "hello",
        "Welcome! I'm your AI debate coach. Please set a debate topic first to begin our structured debate session.",
    ),
    (
        "help",
        "To start, please choose a debate topic and your position using the topic setup form above.",
    ),
    (
        "topic",
        "Please use the debate setup form to choose your topic and position, then we can begin our structured debate with real-time feedback.",
    ),
];

/// Namespace for client-chosen ids on connections without a valid token
pub const GUEST_PREFIX: &str = "guest:";

const LEGACY_DEFAULT: &str = "Please set up a debate topic first using the form above. Once we have a topic and your position, we can begin our debate with detailed AI feedback and analysis.";

/// Reply for a legacy chat message: first keyword hit wins
pub fn legacy_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    LEGACY_REPLIES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(LEGACY_DEFAULT)
}

/// User a debate message is recorded under.
///
/// A token always wins over the `user_id` in the frame. Without one the
/// client's id is kept apart from registered users under [`GUEST_PREFIX`].
pub fn debate_user(user: &AuthUser, claimed: Option<&str>) -> String {
    if user.authenticated {
        return user.user_id.clone();
    }
    match claimed.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{}{}", GUEST_PREFIX, id),
        None => user.user_id.clone(),
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, user: AuthUser) {
    tracing::debug!(user_id = %user.user_id, authenticated = user.authenticated, "WebSocket client connected");

    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket receive failed");
                break;
            }
        };

        for event in handle_frame(&state, &user, text.as_str()).await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode WebSocket event");
                    continue;
                }
            };
            if socket.send(Message::Text(payload.into())).await.is_err() {
                tracing::debug!("WebSocket client went away");
                return;
            }
        }
    }

    tracing::debug!("WebSocket client disconnected");
}

/// Turn one inbound frame into the events to send back, in order
pub async fn handle_frame(state: &AppState, user: &AuthUser, text: &str) -> Vec<ServerEvent> {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            return vec![ServerEvent::Error {
                message: format!("Unrecognised event: {}", e),
            }];
        }
    };

    match event {
        ClientEvent::DebateMessage(msg) => match debate_message(state, user, msg).await {
            Ok(events) => events,
            Err(e) => vec![ServerEvent::Error {
                message: e.client_message(),
            }],
        },
        ClientEvent::ChatMessage(msg) => vec![ServerEvent::AiResponse {
            message: legacy_reply(msg.message.as_deref().unwrap_or_default()).to_string(),
        }],
    }
}

async fn debate_message(
    state: &AppState,
    user: &AuthUser,
    msg: DebateMessage,
) -> Result<Vec<ServerEvent>, ApiError> {
    let user_id = debate_user(user, msg.user_id.as_deref());
    let turn = DebateTurn::from_parts(
        Some(user_id.as_str()),
        msg.topic.as_deref(),
        msg.position.as_deref(),
        msg.message.as_deref(),
        msg.message_count,
    )?;

    let exchange = state.coach().exchange(&turn).await?;

    Ok(vec![
        ServerEvent::DebateFeedback {
            fallback: exchange.feedback.is_fallback(),
            feedback: exchange.feedback.record,
        },
        ServerEvent::AiResponse {
            message: exchange.rebuttal,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_reply() {
        assert!(legacy_reply("Hello there").starts_with("Welcome!"));
        assert!(legacy_reply("HELP me").starts_with("To start"));
        assert!(legacy_reply("which topic?").starts_with("Please use the debate setup form"));
        assert_eq!(legacy_reply("what now"), LEGACY_DEFAULT);
        // hello is checked before help
        assert!(legacy_reply("hello, help").starts_with("Welcome!"));
    }

    #[test]
    fn test_debate_user() {
        let alice = AuthUser {
            user_id: "alice-id".to_string(),
            authenticated: true,
        };
        assert_eq!(debate_user(&alice, Some("bob-id")), "alice-id");
        assert_eq!(debate_user(&AuthUser::demo(), Some("bob-id")), "guest:bob-id");
        assert_eq!(debate_user(&AuthUser::demo(), Some("  ")), crate::auth::DEMO_USER);
        assert_eq!(debate_user(&AuthUser::demo(), None), crate::auth::DEMO_USER);
    }

    #[test]
    fn test_event_envelopes() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"debate_message","data":{"topic":"T","position":"for","message":"M","message_count":2}}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::DebateMessage(ref m) if m.message_count == Some(2)));

        let out = serde_json::to_value(ServerEvent::AiResponse {
            message: "hi".to_string(),
        })
        .unwrap();
        assert_eq!(out, serde_json::json!({"event": "ai_response", "data": {"message": "hi"}}));
    }
}
