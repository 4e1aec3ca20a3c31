//! Scripted assistant texts
//!
//! Fixed replies and canned advice returned verbatim by the rule cascade,
//! plus the opening exchange every backend session is seeded with.

use crate::models::Turn;

/// Reply for greeting turns
pub const GREETING_REPLY: &str =
    "Do you need help with your finances? I can assist with budgeting, saving, or investing!";

/// Follow-up for a bare "yes"
pub const AFFIRMATION_REPLY: &str =
    "Great! Are you more focused on saving, budgeting, or investing? Tell me more so I can assist you better.";

pub const BUDGETING_ADVICE: &str =
    "Budgeting is key! Start by tracking your income and expenses. Try to allocate 50% of your income to necessities, 30% to discretionary expenses, and 20% to savings.";

pub const SAVINGS_ADVICE: &str =
    "Having an emergency fund is important! Aim to save at least 3-6 months' worth of expenses. A high-yield savings account can help you grow your savings.";

pub const INVESTMENT_ADVICE: &str =
    "Investing in index funds is a great way to start. It provides diversification and low fees. Have you considered starting a retirement account like an IRA?";

/// The exchange every backend session is primed with before the first turn
pub fn opening_exchange() -> Vec<Turn> {
    vec![
        Turn::user("Hello, I need help managing my finances."),
        Turn::assistant(
            "Sure! I'd be happy to help. What financial advice are you looking for? Budgeting, saving, or investing?",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_opening_exchange_shape() {
        let exchange = opening_exchange();
        assert_eq!(exchange.len(), 2);
        assert_eq!(exchange[0].role, Role::User);
        assert_eq!(exchange[1].role, Role::Assistant);
    }

    #[test]
    fn test_scripted_texts_carry_no_markers() {
        for text in [
            GREETING_REPLY,
            AFFIRMATION_REPLY,
            BUDGETING_ADVICE,
            SAVINGS_ADVICE,
            INVESTMENT_ADVICE,
        ] {
            assert!(!text.contains("**"));
        }
    }
}
