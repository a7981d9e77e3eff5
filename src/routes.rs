use axum::{Json, Router, extract::{State, rejection::JsonRejection}, http::StatusCode, response::{IntoResponse, Response}, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::{
    error::GenerationError,
    models::{FormOptions, ItemDescriptor, SuggestedCoordinate},
    orchestrator::{Orchestrator, Outcome, Phase, ProcessingState},
};

/// Shown for every text-stage failure kind.
pub const GENERATION_FAILED_MESSAGE: &str = "コーディネートの生成に失敗しました。もう一度お試しください。";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/options", get(get_options))
        .route("/api/coordinate", get(get_coordinate).post(submit_coordinate))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub kind: &'static str,
    pub message: &'static str,
}

impl From<&GenerationError> for ErrorView {
    fn from(err: &GenerationError) -> Self {
        ErrorView { kind: err.kind(), message: GENERATION_FAILED_MESSAGE }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateView {
    pub request_id: Option<Uuid>,
    pub phase: Phase,
    pub is_processing: bool,
    pub is_image_generating: bool,
    pub suggestion: Option<SuggestedCoordinate>,
    pub image_url: Option<String>,
    pub error: Option<ErrorView>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProcessingState> for CoordinateView {
    fn from(state: ProcessingState) -> Self {
        CoordinateView {
            request_id: state.request_id,
            phase: state.phase,
            is_processing: state.is_processing(),
            is_image_generating: state.is_image_generating(),
            error: state.error.as_ref().map(ErrorView::from),
            suggestion: state.suggestion,
            image_url: state.image_url,
            updated_at: state.updated_at,
        }
    }
}

pub async fn get_options() -> Json<FormOptions> {
    Json(FormOptions::new())
}

pub async fn get_coordinate(State(state): State<AppState>) -> Json<CoordinateView> {
    Json(state.orchestrator.snapshot().into())
}

fn rejected(status: StatusCode, message: String) -> Response {
    tracing::info!("Rejected item descriptor: {}", message);
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn submit_coordinate(
    State(state): State<AppState>,
    payload: Result<Json<ItemDescriptor>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejected(rejection.status(), rejection.body_text()),
    };
    let item = match body.validated() {
        Ok(item) => item,
        Err(e) => return rejected(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    let (id, snapshot) = state.orchestrator.begin();
    tracing::info!(%id, "🎯 Accepted submission for {}", item.category);

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        match orchestrator.run(id, item).await {
            Outcome::Completed { image_error: None } => tracing::info!(%id, "✅ Submission completed"),
            Outcome::Completed { image_error: Some(e) } => {
                tracing::info!(%id, kind = e.kind(), "Submission completed without image")
            }
            Outcome::Failed(e) => tracing::info!(%id, kind = e.kind(), "Submission failed"),
            Outcome::Superseded => tracing::debug!(%id, "Submission superseded"),
        }
    });

    (StatusCode::ACCEPTED, Json(CoordinateView::from(snapshot))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::{coordinate, FakeImage, FakeText, Step};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(text: &Arc<FakeText>, image: &Arc<FakeImage>) -> Router {
        router(AppState { orchestrator: Orchestrator::new(text.clone(), image.clone(), "MANUAL") })
    }

    fn form() -> Value {
        json!({
            "category": "Tシャツ",
            "color": "ブラック",
            "tone": "無彩色",
            "attribute": "カジュアル",
            "design": "無地",
            "material": "コットン",
            "width": "55cm",
            "length": "70cm",
            "silhouette": "レギュラー"
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(body: &Value) -> Request<Body> {
        Request::post("/api/coordinate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_state() -> Request<Body> {
        Request::get("/api/coordinate").body(Body::empty()).unwrap()
    }

    async fn settled(app: &Router) -> Value {
        for _ in 0..500 {
            let (_, body) = send(app, get_state()).await;
            if body["phase"] == "done" || body["phase"] == "failed" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("submission never settled");
    }

    #[tokio::test]
    async fn options_list_form_enumerations() {
        let app = app(&FakeText::new([]), &FakeImage::new([]));
        let (status, body) = send(&app, Request::get("/api/options").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["categories"].as_array().unwrap().len(), 18);
        assert_eq!(body["tones"][0], "無彩色 (白・黒・グレー)");
        assert!(body["colors"].as_array().unwrap().iter().any(|c| c == "ブラック"));
    }

    #[tokio::test]
    async fn idle_state_before_any_submission() {
        let app = app(&FakeText::new([]), &FakeImage::new([]));
        let (status, body) = send(&app, get_state()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["requestId"], Value::Null);
        assert_eq!(body["suggestion"], Value::Null);
    }

    #[tokio::test]
    async fn blank_field_is_rejected_without_calling_the_model() {
        let text = FakeText::new([]);
        let app = app(&text, &FakeImage::new([]));
        let mut body = form();
        body["design"] = json!(" ");

        let (status, response) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response["error"], "field `design` must not be empty");
        assert_eq!(text.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_option_label_is_rejected_as_json() {
        let text = FakeText::new([]);
        let app = app(&text, &FakeImage::new([]));
        let mut body = form();
        body["tone"] = json!("不明");

        let (status, response) = send(&app, post(&body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = response["error"].as_str().expect("error message");
        assert!(message.contains("unknown tone: 不明"), "{message}");
        assert_eq!(text.calls(), 0);
        assert_eq!(send(&app, get_state()).await.1["phase"], "idle");
    }

    #[tokio::test]
    async fn accepted_request_id_is_the_one_that_settles() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let text = FakeText::new([Step::ok(coordinate("A")).gated(&gate)]);
        let image = FakeImage::new([Step::err(GenerationError::NoImageProduced)]);
        let app = app(&text, &image);

        let (_, accepted) = send(&app, post(&form())).await;
        let (_, pending) = send(&app, get_state()).await;
        assert_eq!(pending["requestId"], accepted["requestId"]);

        gate.notify_one();
        let done = settled(&app).await;
        assert_eq!(done["requestId"], accepted["requestId"]);
        assert_eq!(done["suggestion"]["title"], "A");
        assert_eq!(done["error"], Value::Null);
    }

    #[tokio::test]
    async fn submission_runs_in_background_and_renders_result() {
        let text = FakeText::new([Step::ok(coordinate("A"))]);
        let image = FakeImage::new([Step::ok("data:image/png;base64,QUJD".to_string())]);
        let app = app(&text, &image);

        let (status, accepted) = send(&app, post(&form())).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(accepted["phase"], "text_pending");
        assert_eq!(accepted["isProcessing"], true);

        let done = settled(&app).await;
        assert_eq!(done["requestId"], accepted["requestId"]);
        assert_eq!(done["suggestion"]["title"], "A");
        assert_eq!(done["suggestion"]["visualPrompt"], coordinate("A").visual_prompt);
        assert_eq!(done["imageUrl"], "data:image/png;base64,QUJD");
        assert_eq!(done["isImageGenerating"], false);
        assert_eq!(done["error"], Value::Null);
    }

    #[tokio::test]
    async fn text_failure_renders_fixed_message() {
        let text = FakeText::new([Step::err(GenerationError::MalformedResponse("trailing comma".into()))]);
        let image = FakeImage::new([]);
        let app = app(&text, &image);

        send(&app, post(&form())).await;
        let failed = settled(&app).await;
        assert_eq!(failed["phase"], "failed");
        assert_eq!(failed["suggestion"], Value::Null);
        assert_eq!(
            failed["error"],
            json!({ "kind": "malformed_response", "message": GENERATION_FAILED_MESSAGE })
        );
        assert_eq!(image.calls(), 0);
    }
}
