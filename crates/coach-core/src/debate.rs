//! Debate shapes: positions, messages, transcripts and persisted records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoachError;
use crate::feedback::FeedbackRecord;

/// Side taken in a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    For,
    Against,
}

impl Position {
    /// The side the AI argues when the user takes `self`
    pub fn opponent(self) -> Self {
        match self {
            Self::For => Self::Against,
            Self::Against => Self::For,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for" => Ok(Self::For),
            "against" => Ok(Self::Against),
            other => Err(CoachError::InvalidInput(format!(
                "position must be 'for' or 'against', got '{}'",
                other
            ))),
        }
    }
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A single immutable transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// 1-based position in the owning transcript
    pub sequence_number: u32,
}

/// Append-only message log for one (user, topic) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, assigning the next sequence number
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let sequence_number = self.messages.len() as u32 + 1;
        self.messages.push(Message {
            sender,
            text: text.into(),
            sequence_number,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The trailing `n` messages, oldest first
    pub fn window(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Identity of a transcript: one per user and topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: String,
    pub topic: String,
}

impl SessionKey {
    pub fn new(user_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic: topic.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user_id, self.topic)
    }
}

/// A validated request to analyze one user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateTurn {
    pub user_id: String,
    pub topic: String,
    pub position: Position,
    pub message: String,
    /// Client-side message counter, used only for prompt framing
    pub message_count: u32,
}

impl DebateTurn {
    /// Validate raw transport fields. Missing or blank topic, position or
    /// message is rejected before any network call happens.
    pub fn from_parts(
        user_id: Option<&str>,
        topic: Option<&str>,
        position: Option<&str>,
        message: Option<&str>,
        message_count: Option<u32>,
    ) -> Result<Self, CoachError> {
        let topic = required("topic", topic)?;
        let position: Position = required("position", position)?.parse()?;
        let message = required("message", message)?;
        let user_id = user_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("anonymous");

        Ok(Self {
            user_id: user_id.to_string(),
            topic,
            position,
            message,
            message_count: message_count.unwrap_or(1).max(1),
        })
    }

    pub fn ai_position(&self) -> Position {
        self.position.opponent()
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(&self.user_id, &self.topic)
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String, CoachError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CoachError::InvalidInput(format!("missing required field: {}", field))),
    }
}

/// The AI's opening move for a new debate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    pub ai_position: Position,
    pub ai_message: String,
}

impl Opening {
    pub fn new(topic: &str, user_position: Position) -> Self {
        let ai_position = user_position.opponent();
        let ai_message = format!(
            "Let's initiate this debate on '{topic}'. Your stance is {user_position}, and mine is \
             {ai_position}. I'll be taking the {ai_position} position. Please present your opening \
             argument, and I'll provide detailed feedback on your debate performance after each message."
        );
        Self {
            ai_position,
            ai_message,
        }
    }
}

/// A persisted analysis of one user message. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRecord {
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    pub position: Position,
    pub argument_text: String,
    pub feedback: FeedbackRecord,
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

impl DebateRecord {
    pub fn new(turn: &DebateTurn, feedback: &FeedbackRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: turn.user_id.clone(),
            topic: turn.topic.clone(),
            position: turn.position,
            argument_text: turn.message.clone(),
            feedback: feedback.clone(),
            score: feedback.score,
            created_at: Utc::now(),
        }
    }
}
