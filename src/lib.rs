//! Personal-Finance Dialogue Router
//!
//! A single-turn dialogue router for a personal-finance assistant:
//! - Ordered, first-match-wins intent rule cascade
//! - Scripted replies and canned advice for common intents
//! - Generative-completion fallback with session context continuity
//! - Append-only conversation transcript + user financial profile
//!
//! TURN FLOW:
//! INPUT → VALIDATE → CLASSIFY → [COMPLETE] → RESPOND → RECORD

pub mod api;
pub mod backend;
pub mod error;
pub mod intent;
pub mod models;
pub mod router;
pub mod script;
pub mod state;

pub use error::Result;

// Re-export common types
pub use backend::{CompletionBackend, GeminiSession, MockBackend};
pub use intent::Intent;
pub use models::*;
pub use router::{DialogueRouter, RouterConfig};
pub use state::ConversationState;
