//! Conversation state
//!
//! Authoritative, ordered record of the dialogue plus the user financial
//! profile. The transcript is append-only: it never shrinks or reorders, and
//! insertion order is conversational order.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::models::{ProfileField, Role, Turn, UserFinancialProfile};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
    profile: UserFinancialProfile,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a confirmed turn.
    ///
    /// Rejects empty text: that is a caller contract violation, not a
    /// retryable condition.
    pub fn append(&mut self, turn: Turn) -> Result<()> {
        if turn.text.trim().is_empty() {
            return Err(RouterError::StateCorruption(
                "turn text must be non-empty".to_string(),
            ));
        }

        self.turns.push(turn);
        Ok(())
    }

    /// Full transcript in insertion order
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterate over the N most recent turns.
    ///
    /// Windowed read access for callers that apply their own truncation
    /// policy when replaying context; the transcript itself never shrinks.
    pub fn recent_turns(&self, count: usize) -> impl DoubleEndedIterator<Item = &Turn> {
        self.turns.iter().rev().take(count)
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Last completed user/assistant exchange, if any
    pub fn last_exchange(&self) -> Option<(&Turn, &Turn)> {
        let len = self.turns.len();
        if len < 2 {
            return None;
        }

        let user = &self.turns[len - 2];
        let assistant = &self.turns[len - 1];
        (user.role == Role::User && assistant.role == Role::Assistant).then_some((user, assistant))
    }

    pub fn profile(&self) -> &UserFinancialProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut UserFinancialProfile {
        &mut self.profile
    }

    pub fn set_profile_field(&mut self, field: ProfileField, value: f64) {
        self.profile.set(field, value);
    }

    pub fn add_goal(&mut self, goal: impl Into<String>) {
        self.profile.goals.push(goal.into());
    }

    /// Formatted transcript (useful for logs and demos)
    pub fn formatted_transcript(&self) -> String {
        let mut out = String::new();

        for turn in &self.turns {
            out.push_str(&format!(
                "{}: {} ({})\n",
                turn.role,
                turn.text,
                turn.timestamp.format("%H:%M:%S")
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut state = ConversationState::new();

        state.append(Turn::user("What is an index fund?")).unwrap();
        state
            .append(Turn::assistant("A fund tracking a market index."))
            .unwrap();
        state.append(Turn::user("And an ETF?")).unwrap();

        let history = state.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].text, "What is an index fund?");
        assert_eq!(history[2].text, "And an ETF?");
    }

    #[test]
    fn test_append_rejects_empty_text() {
        let mut state = ConversationState::new();
        let result = state.append(Turn::user("   "));

        assert!(matches!(result, Err(RouterError::StateCorruption(_))));
        assert_eq!(state.turn_count(), 0);
    }

    #[test]
    fn test_recent_turns_window() {
        let mut state = ConversationState::new();
        for i in 0..10 {
            state.append(Turn::user(format!("Question {}", i))).unwrap();
        }

        let recent: Vec<_> = state.recent_turns(3).collect();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "Question 9");

        // Windowed reads never shrink the transcript
        assert_eq!(state.turn_count(), 10);
    }

    #[test]
    fn test_last_exchange() {
        let mut state = ConversationState::new();
        assert!(state.last_exchange().is_none());

        state.append(Turn::user("hi there, hello")).unwrap();
        state
            .append(Turn::assistant("Do you need help with your finances?"))
            .unwrap();

        let (user, assistant) = state.last_exchange().unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(assistant.role, Role::Assistant);
    }

    #[test]
    fn test_profile_updates() {
        let mut state = ConversationState::new();

        state.set_profile_field(ProfileField::Savings, 1200.0);
        state.set_profile_field(ProfileField::Savings, 1500.0);
        state.add_goal("Build an emergency fund");
        state.add_goal("Pay off credit card");

        assert_eq!(state.profile().savings, Some(1500.0));
        assert_eq!(state.profile().goals.len(), 2);
        assert_eq!(state.profile().goals[0], "Build an emergency fund");
    }
}
