//! Mock implementations for testing
//!
//! These mocks enable controller and screen tests without real I/O.

use crate::llm::{CompletionRequest, CompletionResponse, CompletionService, LlmError};
use crate::speech::{SpeechError, SpeechPlayer};
use crate::state_machine::ChatState;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};

// ============================================================================
// Mock Completion Service
// ============================================================================

/// Mock completion service that returns queued responses
pub struct MockCompletionService {
    responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<CompletionRequest>>,
    /// Optional view of controller state, sampled when a request arrives
    state_probe: Mutex<Option<watch::Receiver<ChatState>>>,
    observed: Mutex<Vec<ChatState>>,
}

impl MockCompletionService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            state_probe: Mutex::new(None),
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: CompletionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Sample `rx` each time a request arrives
    pub fn observe_state(&self, rx: watch::Receiver<ChatState>) {
        *self.state_probe.lock().unwrap() = Some(rx);
    }

    /// States seen at request time
    pub fn observed_states(&self) -> Vec<ChatState> {
        self.observed.lock().unwrap().clone()
    }

    fn record(&self, request: &CompletionRequest) {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(rx) = self.state_probe.lock().unwrap().as_ref() {
            self.observed.lock().unwrap().push(rx.borrow().clone());
        }
    }

    fn next_response(&self) -> Result<CompletionResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.record(request);
        self.next_response()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Delayed Mock Completion Service (for overlap and timeout testing)
// ============================================================================

/// Mock completion service with configurable delay
pub struct DelayedMockCompletionService {
    inner: MockCompletionService,
    delay: Duration,
    /// Signalled when a request starts (holds a permit if nobody waits yet)
    pub request_started: Arc<Notify>,
}

impl DelayedMockCompletionService {
    pub fn new(model_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MockCompletionService::new(model_id),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_response(&self, response: CompletionResponse) {
        self.inner.queue_response(response);
    }

    pub fn request_count(&self) -> usize {
        self.inner.request_count()
    }
}

#[async_trait]
impl CompletionService for DelayedMockCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.inner.record(request);
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

// ============================================================================
// Mock Speech Player
// ============================================================================

/// Speech player that records calls; playback "ends" only via `finish`
#[derive(Default)]
pub struct MockSpeechPlayer {
    speaking: AtomicBool,
    /// Texts passed to `speak`
    pub spoken: Mutex<Vec<String>>,
    /// Number of `stop` calls
    pub stops: Mutex<usize>,
}

impl MockSpeechPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate playback ending on its own
    pub fn finish(&self) {
        self.speaking.store(false, Ordering::SeqCst);
    }

    /// Simulate playback started by someone else
    pub fn start_externally(&self) {
        self.speaking.store(true, Ordering::SeqCst);
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

impl SpeechPlayer for MockSpeechPlayer {
    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if self.is_speaking() {
            return Ok(());
        }
        self.spoken.lock().unwrap().push(text.to_string());
        self.speaking.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), SpeechError> {
        *self.stops.lock().unwrap() += 1;
        self.speaking.store(false, Ordering::SeqCst);
        Ok(())
    }
}
