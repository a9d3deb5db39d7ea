//! Data model for user sessions, tasks, and answers

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use ulid::Ulid;

use crate::error::AskadayError;

/// Stable end-user identifier, assigned by the transport
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct UserId(pub u64);

impl UserId {
    /// Big-endian key bytes for the session store
    pub fn key_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Unique task identifier (ULID string)
///
/// The scheduler holds this id as a weak reference and re-resolves the
/// task from the store at fire time.
pub type TaskId = String;

/// Generate a new ULID for a task
///
/// ULIDs are preferred over UUIDs as they are sortable by creation time
/// and more human-readable.
pub fn new_task_id() -> TaskId {
    Ulid::new().to_string()
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid time pattern"))
}

/// A wall-clock time of day for a daily reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Hour in [0, 23]
    pub hour: u8,
    /// Minute in [0, 59]
    pub minute: u8,
}

impl TimeOfDay {
    /// Parse a strict `HH:MM` time string
    ///
    /// Accepts one- or two-digit hours in [0, 23] and exactly two-digit
    /// minutes in [00, 59]: `"9:05"` and `"09:05"` are valid, `"25:00"`,
    /// `"9:5"`, and `"9:05x"` are not.
    ///
    /// # Errors
    ///
    /// Returns `AskadayError::Validation` when the input does not match
    /// the grammar.
    pub fn parse(input: &str) -> Result<Self, AskadayError> {
        let captures = time_pattern()
            .captures(input)
            .ok_or_else(|| AskadayError::Validation(format!("not a valid HH:MM time: {input:?}")))?;

        // The pattern guarantees both groups are small decimal numbers.
        let hour: u8 = captures[1].parse().expect("matched hour digits");
        let minute: u8 = captures[2].parse().expect("matched minute digits");
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A user-defined recurring question with a daily fire time
///
/// Tasks are created by the add flow, deleted by index, and never mutated
/// in place (delete and recreate to change one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id; the scheduler's weak reference
    pub id: TaskId,
    /// Owning user (non-owning back-reference)
    pub owner: UserId,
    /// The question to ask
    pub text: String,
    /// Daily fire time in the configured fixed timezone
    pub time: TimeOfDay,
}

/// A durable record pairing a delivered question with the user's reply
///
/// Append-only: answers are never deleted or mutated, and they survive
/// deletion of the task that asked them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// When the answer was recorded
    pub timestamp: DateTime<Utc>,
    /// The question that was asked
    pub question: String,
    /// The user's reply
    pub text: String,
}

/// Current position of a user in the menu dialogue
///
/// Answering mode is intentionally not a variant here: a fired reminder
/// sets [`UserSession::pending_question`] without touching this field, so
/// the user can keep navigating the menu while a question is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConversationState {
    /// Resting state: menu actions are available
    #[default]
    Choosing,
    /// Waiting for the question text of a new task
    SettingQuestion,
    /// Waiting for the HH:MM time of a new task
    SettingTime,
    /// Waiting for a 1-based task number to delete
    Deleting,
}

/// Per-user conversational state plus collected tasks and answers
///
/// One record per user in the session store. At most one of
/// `pending_task_text` / `pending_question` is set at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Owning user id
    pub user: UserId,
    /// Current dialogue state
    pub state: ConversationState,
    /// Question text captured but not yet time-bound
    pub pending_task_text: Option<String>,
    /// Task text currently awaiting an answer (set by a reminder fire)
    pub pending_question: Option<String>,
    /// Scheduled tasks, insertion order (1-based display order)
    pub tasks: Vec<Task>,
    /// Append-only answer log
    pub answers: Vec<Answer>,
}

impl UserSession {
    /// Create an empty session for a user
    ///
    /// All collections start initialized; no field is created lazily.
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            state: ConversationState::Choosing,
            pending_task_text: None,
            pending_question: None,
            tasks: Vec::new(),
            answers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_parse_accepts_valid_forms() {
        assert_eq!(
            TimeOfDay::parse("09:00").unwrap(),
            TimeOfDay { hour: 9, minute: 0 }
        );
        assert_eq!(
            TimeOfDay::parse("9:05").unwrap(),
            TimeOfDay { hour: 9, minute: 5 }
        );
        assert_eq!(
            TimeOfDay::parse("0:00").unwrap(),
            TimeOfDay { hour: 0, minute: 0 }
        );
        assert_eq!(
            TimeOfDay::parse("23:59").unwrap(),
            TimeOfDay {
                hour: 23,
                minute: 59
            }
        );
    }

    #[test]
    fn test_time_parse_rejects_invalid_forms() {
        for input in [
            "25:00", "24:00", "9:5", "9:05x", "x9:05", "09:60", "9", ":30", "09-00", "", " 9:05",
            "9:05 ",
        ] {
            assert!(
                TimeOfDay::parse(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_time_display_zero_pads() {
        let time = TimeOfDay { hour: 9, minute: 5 };
        assert_eq!(time.to_string(), "09:05");
    }

    #[test]
    fn test_new_task_id_is_unique_ulid() {
        let a = new_task_id();
        let b = new_task_id();
        assert_eq!(a.len(), 26);
        assert_ne!(a, b);
    }

    #[test]
    fn test_user_id_key_bytes_are_big_endian() {
        assert_eq!(UserId(1).key_bytes(), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(UserId(256).key_bytes(), [0, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_new_session_starts_empty_and_choosing() {
        let session = UserSession::new(UserId(42));
        assert_eq!(session.state, ConversationState::Choosing);
        assert!(session.pending_task_text.is_none());
        assert!(session.pending_question.is_none());
        assert!(session.tasks.is_empty());
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_session_roundtrips_through_json() {
        let mut session = UserSession::new(UserId(7));
        session.tasks.push(Task {
            id: new_task_id(),
            owner: UserId(7),
            text: "Mood?".to_string(),
            time: TimeOfDay { hour: 9, minute: 0 },
        });
        session.answers.push(Answer {
            timestamp: Utc::now(),
            question: "Mood?".to_string(),
            text: "good".to_string(),
        });

        let json = serde_json::to_string(&session).expect("serialize");
        let back: UserSession = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, session);
    }
}
