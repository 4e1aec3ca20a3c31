//! Completion backend seam
//!
//! The router's only external boundary. The production implementation talks
//! to the Gemini generateContent REST API over a long-lived reqwest::Client
//! for connection pooling. The REST API is stateless, so the session owns
//! conversational continuity by replaying its accumulated contents on every
//! call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RouterError};
use crate::models::{Role, Turn};

/// Stateful handle to a generative-completion service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Establish initial context. Called once per session, or again with the
    /// recorded transcript when a session is rehydrated.
    async fn prime(&mut self, history: &[Turn]) -> Result<()>;

    /// Send one utterance. Each successful call extends the backend's own
    /// context with the utterance and its reply; a failed call leaves the
    /// context unchanged so a retry replays cleanly.
    async fn send(&mut self, utterance: &str) -> Result<String>;
}

const SYSTEM_PROMPT: &str = r#"You are a friendly personal-finance assistant.

Guidelines:
- Provide accurate and educational financial information
- Be concise and conversational
- Emphasize budgeting, saving, and investing fundamentals
- Use plain, approachable language

Format: Provide short answers suitable for a chat conversation."#;

/// Gemini-backed completion session (connection-pooled)
pub struct GeminiSession {
    client: Client,
    api_key: String,
    base_url: String,
    contents: Vec<Content>,
}

impl GeminiSession {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent".to_string(),
            contents: Vec::new(),
        }
    }

    fn role_to_wire(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }

    /// Run one generateContent call over the accumulated contents
    async fn generate(&self) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(RouterError::BackendFailure(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);

        let request = GeminiRequest {
            contents: self.contents.clone(),
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 1024,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
        };

        info!("Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                RouterError::BackendFailure(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(RouterError::BackendFailure(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            RouterError::BackendFailure(format!("Gemini parse error: {}", e))
        })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        let candidate = gemini_response.candidates.first().ok_or_else(|| {
            RouterError::BackendFailure("No response from Gemini API".to_string())
        })?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                warn!("Gemini finish reason: {}", reason);
            }
        }

        let text = candidate
            .content
            .parts
            .first()
            .map(|p| p.text.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RouterError::BackendFailure(
                "Empty response from Gemini".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl CompletionBackend for GeminiSession {
    async fn prime(&mut self, history: &[Turn]) -> Result<()> {
        self.contents = history
            .iter()
            .map(|turn| Content {
                role: Self::role_to_wire(turn.role).to_string(),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        Ok(())
    }

    async fn send(&mut self, utterance: &str) -> Result<String> {
        self.contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: utterance.to_string(),
            }],
        });

        match self.generate().await {
            Ok(reply) => {
                self.contents.push(Content {
                    role: "model".to_string(),
                    parts: vec![Part {
                        text: reply.clone(),
                    }],
                });
                Ok(reply)
            }
            Err(e) => {
                // Roll back the pending utterance so a retry replays a clean
                // context.
                self.contents.pop();
                Err(e)
            }
        }
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Clone, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: i32,
    candidates_token_count: i32,
}

//
// ================= Mock Backend =================
//

/// Mock backend for development & testing.
/// Keeps the router functional without an LLM dependency: replies come from
/// a scripted queue and every call is recorded for inspection. Clones share
/// the same underlying session, so a clone kept outside the router observes
/// the calls made through it.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<RwLock<VecDeque<String>>>,
    sent: Arc<RwLock<Vec<String>>>,
    primed: Arc<RwLock<Vec<Turn>>>,
    fail_next: Arc<RwLock<bool>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(RwLock::new(replies.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.replies.write().await.push_back(reply.into());
    }

    /// Make the next `send` fail with a backend failure
    pub async fn fail_next_send(&self) {
        *self.fail_next.write().await = true;
    }

    /// Utterances seen so far, in call order
    pub async fn sent(&self) -> Vec<String> {
        self.sent.read().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// History the session was last primed with
    pub async fn primed_history(&self) -> Vec<Turn> {
        self.primed.read().await.clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn prime(&mut self, history: &[Turn]) -> Result<()> {
        *self.primed.write().await = history.to_vec();
        Ok(())
    }

    async fn send(&mut self, utterance: &str) -> Result<String> {
        if std::mem::take(&mut *self.fail_next.write().await) {
            return Err(RouterError::BackendFailure(
                "mock backend failure".to_string(),
            ));
        }

        self.sent.write().await.push(utterance.to_string());

        let reply = self.replies.write().await.pop_front().unwrap_or_else(|| {
            "I can help with budgeting, saving, and investing.".to_string()
        });

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: "How do I start budgeting?".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 1024,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: "You are a personal-finance assistant".to_string(),
                }],
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("How do I start budgeting?"));
        assert!(json.contains("generationConfig"));
        assert!(json.contains("maxOutputTokens"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Track your spending first."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8}
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.candidates[0].content.parts[0].text,
            "Track your spending first."
        );
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[tokio::test]
    async fn test_gemini_prime_maps_roles() {
        let mut session = GeminiSession::new("test-key".to_string());
        session
            .prime(&[Turn::user("hi"), Turn::assistant("hello back")])
            .await
            .unwrap();

        assert_eq!(session.contents.len(), 2);
        assert_eq!(session.contents[0].role, "user");
        assert_eq!(session.contents[1].role, "model");
    }

    #[tokio::test]
    async fn test_gemini_send_rolls_back_on_failure() {
        // An empty key fails before any network traffic
        let mut session = GeminiSession::new(String::new());
        session.prime(&[Turn::user("hi")]).await.unwrap();

        let result = session.send("what about bonds?").await;
        assert!(matches!(result, Err(RouterError::BackendFailure(_))));
        assert_eq!(session.contents.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_scripted_replies() {
        let mut backend = MockBackend::new();
        backend.push_reply("first").await;
        backend.push_reply("second").await;

        assert_eq!(backend.send("a").await.unwrap(), "first");
        assert_eq!(backend.send("b").await.unwrap(), "second");
        assert_eq!(backend.sent().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_mock_backend_clone_shares_session() {
        let backend = MockBackend::new();
        let probe = backend.clone();

        let mut boxed: Box<dyn CompletionBackend> = Box::new(backend);
        boxed.send("shared call").await.unwrap();

        assert_eq!(probe.sent_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_backend_fail_next() {
        let mut backend = MockBackend::new();
        backend.fail_next_send().await;

        assert!(backend.send("boom").await.is_err());
        assert_eq!(backend.sent_count().await, 0);

        // Failure flag is one-shot
        assert!(backend.send("ok").await.is_ok());
    }
}
