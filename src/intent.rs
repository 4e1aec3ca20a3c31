//! Intent rule cascade
//!
//! Classifies a single utterance into either:
//! - Scripted: fixed replies that never touch the backend (greeting, affirmation)
//! - Completion-backed: canned advice overrides (budgeting, savings, investing)
//!   and the open-ended generation fallback

/// Static marker list — zero allocation
const GREETING_MARKERS: &[&str] = &["hello", "hey", "hlo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Affirmation,
    Budgeting,
    Savings,
    Investing,
    OpenEnded,
}

impl Intent {
    /// Classify one utterance.
    ///
    /// Matching is case-insensitive and substring-based with no word-boundary
    /// guard ("investing" matches "invest", "save" matches inside other
    /// words). The priority order below is fixed; first match wins.
    pub fn classify(utterance: &str) -> Intent {
        let lowered = utterance.to_lowercase();

        if GREETING_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Intent::Greeting;
        }
        if lowered.trim() == "yes" {
            return Intent::Affirmation;
        }

        if lowered.contains("budget") {
            Intent::Budgeting
        } else if lowered.contains("save") {
            Intent::Savings
        } else if lowered.contains("invest") {
            Intent::Investing
        } else {
            Intent::OpenEnded
        }
    }

    /// Whether routing this intent reaches the completion backend
    pub fn requires_completion(self) -> bool {
        !matches!(self, Intent::Greeting | Intent::Affirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_markers() {
        let cases = vec![
            "Hello, can you help?",
            "HEY there",
            "hlo",
            "well hello again",
        ];

        for c in cases {
            assert_eq!(Intent::classify(c), Intent::Greeting);
        }
    }

    #[test]
    fn test_greeting_wins_over_keywords() {
        assert_eq!(
            Intent::classify("hello, how do I budget?"),
            Intent::Greeting
        );
    }

    #[test]
    fn test_affirmation_exact_match_only() {
        assert_eq!(Intent::classify("yes"), Intent::Affirmation);
        assert_eq!(Intent::classify("  YES  "), Intent::Affirmation);
        assert_eq!(Intent::classify("yes please"), Intent::OpenEnded);
    }

    #[test]
    fn test_keyword_priority_order() {
        assert_eq!(Intent::classify("budget and save"), Intent::Budgeting);
        assert_eq!(Intent::classify("save or invest?"), Intent::Savings);
        assert_eq!(
            Intent::classify("is investing risky right now?"),
            Intent::Investing
        );
    }

    #[test]
    fn test_substring_matching_has_no_word_boundary() {
        assert_eq!(Intent::classify("I am a big saver"), Intent::Savings);
        assert_eq!(Intent::classify("investments scare me"), Intent::Investing);
    }

    #[test]
    fn test_open_ended_fallback() {
        assert_eq!(
            Intent::classify("What's the weather today?"),
            Intent::OpenEnded
        );
    }

    #[test]
    fn test_requires_completion() {
        assert!(!Intent::Greeting.requires_completion());
        assert!(!Intent::Affirmation.requires_completion());
        assert!(Intent::Budgeting.requires_completion());
        assert!(Intent::OpenEnded.requires_completion());
    }
}
