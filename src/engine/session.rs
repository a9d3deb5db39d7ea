//! Menu vocabulary and dialogue rendering
//!
//! The menu labels double as the button captions on the reply keyboard and
//! as the exact strings the state machine matches against. Matching is
//! whole-message and case-sensitive, the same contract a one-tap reply
//! keyboard gives: tapping a button echoes its label verbatim.

use crate::store::{Answer, Task};
use crate::transport::Keyboard;

/// "Add a new question" menu label
pub const LABEL_ADD: &str = "Add";
/// "List my questions" menu label
pub const LABEL_MY_QUESTIONS: &str = "My questions";
/// "List my recorded answers" menu label
pub const LABEL_MY_ANSWERS: &str = "My answers";
/// "Export my answers as a document" menu label
pub const LABEL_DOWNLOAD: &str = "Download answers";
/// "Delete a question" menu label
pub const LABEL_DELETE: &str = "Delete question";
/// Goodbye label; valid from any state via the fallback route
pub const LABEL_GOODBYE: &str = "That's all";

/// Greeting sent when a user first shows up
pub const MSG_GREETING: &str = "Hi! I will help you remember to ask yourself things.";
/// Resting-state prompt accompanying the menu keyboard
pub const MSG_MENU: &str = "What can I do for you?";
/// Prompt for the question text of a new task
pub const MSG_ASK_QUESTION: &str = "What should I ask you?";
/// Re-prompt for a malformed time string
pub const MSG_BAD_TIME: &str = "That time doesn't look right. Send it as HH:MM, e.g. 09:30";
/// Rejection for an unusable delete number
pub const MSG_NO_SUCH_NUMBER: &str = "No such number. Send the number of a question from the list.";
/// Prompt for the number of the task to delete
pub const MSG_PICK_DELETE: &str = "Which question should I remove? Send its number:";
/// Notice when the task list is empty
pub const MSG_NO_TASKS: &str = "You have no questions yet. Send \"Add\" to create one.";
/// Notice when the answer log is empty
pub const MSG_NO_ANSWERS: &str = "You haven't answered anything yet.";
/// Farewell for the goodbye route
pub const MSG_GOODBYE: &str = "See you next time!";
/// Generic reply for a storage failure; the transition is not committed
pub const MSG_FAILURE: &str = "Something went wrong on my side. Please try again.";

/// A menu action chosen while in the resting state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start the add-question flow
    Add,
    /// List scheduled questions
    MyQuestions,
    /// List recorded answers
    MyAnswers,
    /// Export answers as a CSV document
    Download,
    /// Start the delete flow
    Delete,
}

impl MenuAction {
    /// Match a whole message against the menu labels
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            LABEL_ADD => Some(Self::Add),
            LABEL_MY_QUESTIONS => Some(Self::MyQuestions),
            LABEL_MY_ANSWERS => Some(Self::MyAnswers),
            LABEL_DOWNLOAD => Some(Self::Download),
            LABEL_DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

/// The resting-state reply keyboard
pub fn menu_keyboard() -> Keyboard {
    Keyboard::single_row([
        LABEL_ADD,
        LABEL_MY_QUESTIONS,
        LABEL_MY_ANSWERS,
        LABEL_DOWNLOAD,
        LABEL_DELETE,
        LABEL_GOODBYE,
    ])
}

/// Render the 1-indexed task list shown by "My questions" and the delete
/// flow
pub fn render_task_list(tasks: &[Task]) -> String {
    let mut lines = vec!["Here are the questions I ask you:".to_string()];
    for (position, task) in tasks.iter().enumerate() {
        lines.push(format!("{}. {} at {}", position + 1, task.text, task.time));
    }
    lines.join("\n")
}

/// Render the 1-indexed answer history shown by "My answers"
pub fn render_answer_list(answers: &[Answer]) -> String {
    let mut lines = vec!["Here is what you have told me:".to_string()];
    for (position, answer) in answers.iter().enumerate() {
        lines.push(format!(
            "{}. [{}] {}: {}",
            position + 1,
            answer.timestamp.format("%Y-%m-%d %H:%M"),
            answer.question,
            answer.text
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{new_task_id, TimeOfDay, UserId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_menu_action_parses_exact_labels_only() {
        assert_eq!(MenuAction::parse("Add"), Some(MenuAction::Add));
        assert_eq!(MenuAction::parse("My questions"), Some(MenuAction::MyQuestions));
        assert_eq!(MenuAction::parse("My answers"), Some(MenuAction::MyAnswers));
        assert_eq!(MenuAction::parse("Download answers"), Some(MenuAction::Download));
        assert_eq!(MenuAction::parse("Delete question"), Some(MenuAction::Delete));

        assert_eq!(MenuAction::parse("add"), None);
        assert_eq!(MenuAction::parse("Add "), None);
        assert_eq!(MenuAction::parse("Addendum"), None);
        assert_eq!(MenuAction::parse("That's all"), None);
    }

    #[test]
    fn test_menu_keyboard_lists_every_action() {
        let keyboard = menu_keyboard();
        let labels: Vec<&str> = keyboard.labels().collect();
        assert_eq!(
            labels,
            vec![
                "Add",
                "My questions",
                "My answers",
                "Download answers",
                "Delete question",
                "That's all"
            ]
        );
    }

    #[test]
    fn test_render_task_list_is_one_indexed() {
        let tasks = vec![
            Task {
                id: new_task_id(),
                owner: UserId(1),
                text: "Mood?".to_string(),
                time: TimeOfDay { hour: 9, minute: 0 },
            },
            Task {
                id: new_task_id(),
                owner: UserId(1),
                text: "Sleep?".to_string(),
                time: TimeOfDay {
                    hour: 22,
                    minute: 30,
                },
            },
        ];
        let rendered = render_task_list(&tasks);
        assert!(rendered.contains("1. Mood? at 09:00"));
        assert!(rendered.contains("2. Sleep? at 22:30"));
    }

    #[test]
    fn test_render_answer_list_includes_question_and_reply() {
        let answers = vec![Answer {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 2, 0).unwrap(),
            question: "Mood?".to_string(),
            text: "pretty good".to_string(),
        }];
        let rendered = render_answer_list(&answers);
        assert!(rendered.contains("1. [2024-03-01 09:02] Mood?: pretty good"));
    }
}
