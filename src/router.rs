//! Dialogue router - the per-turn decision core
//!
//! TURN FLOW:
//! INPUT → VALIDATE → CLASSIFY → [COMPLETE] → RESPOND → RECORD

use tracing::{debug, info, warn};

use crate::backend::CompletionBackend;
use crate::error::{Result, RouterError};
use crate::intent::Intent;
use crate::models::{ProfileField, Turn};
use crate::script;
use crate::state::ConversationState;

/// Router behavior knobs
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Keyword-overridden turns still call the backend so its context stays
    /// continuous across turns. Disable when continuity is not needed.
    pub keyword_rules_call_backend: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            keyword_rules_call_backend: true,
        }
    }
}

/// Maps one raw utterance to one response string, updating conversation
/// state exactly once per call.
///
/// Owns its backend session and conversation state; `handle_turn` takes
/// `&mut self`, so turns against one router are serialized by construction.
/// Concurrent sessions each get their own router.
pub struct DialogueRouter {
    backend: Box<dyn CompletionBackend>,
    state: ConversationState,
    config: RouterConfig,
}

impl DialogueRouter {
    pub fn new(backend: Box<dyn CompletionBackend>, state: ConversationState) -> Self {
        Self::with_config(backend, state, RouterConfig::default())
    }

    pub fn with_config(
        backend: Box<dyn CompletionBackend>,
        state: ConversationState,
        config: RouterConfig,
    ) -> Self {
        Self {
            backend,
            state,
            config,
        }
    }

    /// Seed the backend with the opening exchange plus any turns already in
    /// the transcript (the rehydration path for a restored state).
    pub async fn prime(&mut self) -> Result<()> {
        let mut context = script::opening_exchange();
        context.extend(self.state.history().iter().cloned());

        debug!(context_turns = context.len(), "Priming backend session");
        self.backend.prime(&context).await
    }

    /// Route one utterance to a response.
    ///
    /// Appends exactly one USER and one ASSISTANT turn, in that order, only
    /// after the response is finalized. A backend failure appends nothing,
    /// so retrying with the same utterance is safe.
    pub async fn handle_turn(&mut self, utterance: &str) -> Result<String> {
        if utterance.trim().is_empty() {
            return Err(RouterError::InvalidInput(
                "utterance must be non-empty".to_string(),
            ));
        }

        let intent = Intent::classify(utterance);
        debug!(?intent, "Utterance classified");

        let response = match intent {
            Intent::Greeting => script::GREETING_REPLY.to_string(),
            Intent::Affirmation => script::AFFIRMATION_REPLY.to_string(),
            Intent::Budgeting => {
                self.overridden_completion(utterance, script::BUDGETING_ADVICE)
                    .await?
            }
            Intent::Savings => {
                self.overridden_completion(utterance, script::SAVINGS_ADVICE)
                    .await?
            }
            Intent::Investing => {
                self.overridden_completion(utterance, script::INVESTMENT_ADVICE)
                    .await?
            }
            Intent::OpenEnded => {
                let completion = self.backend.send(utterance).await.map_err(|e| {
                    warn!("Backend call failed: {}", e);
                    e
                })?;
                strip_bold_markers(&completion)
            }
        };

        self.state.append(Turn::user(utterance))?;
        self.state.append(Turn::assistant(&response))?;

        info!(turns = self.state.turn_count(), "Turn recorded");

        Ok(response)
    }

    /// Keyword-overridden turn: the canned advice wins, but the backend
    /// still sees the utterance so its context stays continuous. A failed
    /// side-effect call fails the whole turn; nothing is appended and the
    /// caller may retry.
    async fn overridden_completion(&mut self, utterance: &str, advice: &str) -> Result<String> {
        if self.config.keyword_rules_call_backend {
            self.backend.send(utterance).await.map_err(|e| {
                warn!("Backend call failed: {}", e);
                e
            })?;
        }

        Ok(advice.to_string())
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Explicit profile-update command. Profile capture never happens inside
    /// the routing cascade.
    pub fn update_profile(&mut self, field: ProfileField, value: f64) {
        self.state.set_profile_field(field, value);
    }

    pub fn add_goal(&mut self, goal: impl Into<String>) {
        self.state.add_goal(goal);
    }
}

/// Remove literal markdown bold markers from backend text
fn strip_bold_markers(text: &str) -> String {
    text.replace("**", "")
}
