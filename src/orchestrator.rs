use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::GenerationError;
use crate::models::{ItemDescriptor, SuggestedCoordinate};
use crate::prompt::{build_suggestion_request, SuggestionRequest};

#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn generate_suggestion(&self, request: &SuggestionRequest) -> Result<SuggestedCoordinate, GenerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the rendered image as a `data:` URI.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    TextPending,
    ImagePending,
    Failed,
    Done,
}

/// What the result display renders. Only the submission named by
/// `request_id` may write to it.
#[derive(Debug, Clone)]
pub struct ProcessingState {
    pub request_id: Option<Uuid>,
    pub phase: Phase,
    pub suggestion: Option<SuggestedCoordinate>,
    pub image_url: Option<String>,
    pub error: Option<GenerationError>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingState {
    fn idle() -> Self {
        Self {
            request_id: None,
            phase: Phase::Idle,
            suggestion: None,
            image_url: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::TextPending
    }

    pub fn is_image_generating(&self) -> bool {
        self.phase == Phase::ImagePending
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Failed | Phase::Done)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimeouts {
    pub text: Option<Duration>,
    pub image: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Text stage failed; nothing was shown but the error.
    Failed(GenerationError),
    /// Suggestion shown. `image_error` is set when only the picture is missing.
    Completed { image_error: Option<GenerationError> },
    /// A newer submission took over the display before this one settled.
    Superseded,
}

#[derive(Clone)]
pub struct Orchestrator {
    text: Arc<dyn SuggestionGenerator>,
    image: Arc<dyn ImageGenerator>,
    manual: Arc<str>,
    timeouts: StageTimeouts,
    state: Arc<RwLock<ProcessingState>>,
}

impl Orchestrator {
    pub fn new(text: Arc<dyn SuggestionGenerator>, image: Arc<dyn ImageGenerator>, manual: impl Into<Arc<str>>) -> Self {
        Self {
            text,
            image,
            manual: manual.into(),
            timeouts: StageTimeouts::default(),
            state: Arc::new(RwLock::new(ProcessingState::idle())),
        }
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn snapshot(&self) -> ProcessingState {
        self.state.read().clone()
    }

    /// Clears the previous result and claims the display for a new request.
    /// Returns the new id with the state it was claimed with.
    pub fn begin(&self) -> (Uuid, ProcessingState) {
        let id = Uuid::new_v4();
        let mut state = self.state.write();
        if let Some(previous) = state.request_id.filter(|_| !state.is_settled()) {
            info!(%previous, %id, "Superseding in-flight submission");
        }
        *state = ProcessingState {
            request_id: Some(id),
            phase: Phase::TextPending,
            ..ProcessingState::idle()
        };
        (id, state.clone())
    }

    pub async fn submit(&self, item: ItemDescriptor) -> Outcome {
        let (id, _) = self.begin();
        self.run(id, item).await
    }

    /// Drives a submission claimed by [`Orchestrator::begin`] to completion.
    pub async fn run(&self, id: Uuid, item: ItemDescriptor) -> Outcome {
        info!(%id, "🚀 Generating coordinate for {} ({})", item.category, item.color);

        let request = build_suggestion_request(&item, &self.manual);
        let coordinate = match with_timeout(self.timeouts.text, self.text.generate_suggestion(&request)).await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                error!(%id, "❌ Suggestion generation failed: {}", e);
                let applied = self.update(id, |state| {
                    state.phase = Phase::Failed;
                    state.error = Some(e.clone());
                });
                return if applied { Outcome::Failed(e) } else { Outcome::Superseded };
            }
        };

        let prompt = coordinate.visual_prompt().to_string();
        let applied = self.update(id, |state| {
            state.suggestion = Some(coordinate);
            state.phase = Phase::ImagePending;
        });
        if !applied {
            return Outcome::Superseded;
        }

        let image = with_timeout(self.timeouts.image, self.image.generate_image(&prompt)).await;
        let image_error = match &image {
            Ok(_) => {
                info!(%id, "✅ Coordinate image generated");
                None
            }
            Err(e) => {
                warn!(%id, "Image generation failed, keeping suggestion without image: {}", e);
                Some(e.clone())
            }
        };

        let applied = self.update(id, |state| {
            state.image_url = image.ok();
            state.phase = Phase::Done;
        });
        if applied {
            Outcome::Completed { image_error }
        } else {
            Outcome::Superseded
        }
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut ProcessingState)) -> bool {
        let mut state = self.state.write();
        if state.request_id != Some(id) {
            debug!(%id, current = ?state.request_id, "Discarding result of superseded submission");
            return false;
        }
        apply(&mut state);
        state.updated_at = Utc::now();
        true
    }
}

async fn with_timeout<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, GenerationError>>,
) -> Result<T, GenerationError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(GenerationError::Timeout(limit))),
        None => call.await,
    }
}
