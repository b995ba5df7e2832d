//! LLM Trait Abstraction
//!
//! Two seams over the language-model provider:
//! - `StructuredGenerator`: one schema-constrained generation per analysis
//! - `ChatResponder`: stateless follow-up chat completion
//!
//! Production code uses `OpenAiClient` (see `llm_client`). Tests use the
//! fakes below, which record calls and return pre-configured results.

use crate::prompts::AnalysisPrompt;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use topicweight_common::{AnalysisError, ChatMessage, GeneratedCategory};

// ============================================================================
// Traits
// ============================================================================

/// Structured category generation.
///
/// Implementations make exactly one provider call and never retry. Any
/// missing, refused, or schema-invalid payload is `AnalysisError::Generation`.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, prompt: &AnalysisPrompt)
        -> Result<Vec<GeneratedCategory>, AnalysisError>;
}

/// Chat completion for follow-up questions.
///
/// Failures are `AnalysisError::Provider`.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError>;
}

// ============================================================================
// Fake Generator (Testing)
// ============================================================================

/// Generator returning a fixed result
pub struct FakeGenerator {
    result: Result<Vec<GeneratedCategory>, AnalysisError>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<AnalysisPrompt>>,
}

impl FakeGenerator {
    pub fn returning(categories: Vec<GeneratedCategory>) -> Self {
        Self {
            result: Ok(categories),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(AnalysisError::Generation(message.to_string())),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<AnalysisPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &AnalysisPrompt,
    ) -> Result<Vec<GeneratedCategory>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        self.result.clone()
    }
}

// ============================================================================
// Fake Chat Responder (Testing)
// ============================================================================

/// Chat responder returning a fixed reply
pub struct FakeChatResponder {
    result: Result<String, AnalysisError>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl FakeChatResponder {
    pub fn replying(reply: &str) -> Self {
        Self {
            result: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(AnalysisError::Provider(message.to_string())),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatResponder for FakeChatResponder {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        self.result.clone()
    }
}
