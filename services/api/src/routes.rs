use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use medscore::catalog::TestSummary;
use medscore::conversation::{score_answers, ChatId, ConversationService, DiagnosisOutcome, Reply};
use medscore::error::AppError;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRequest {
    pub(crate) text: String,
}

/// Stateless scoring input: a test name or command plus points per parameter.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) test: String,
    #[serde(default)]
    pub(crate) answers: HashMap<String, i32>,
}

pub(crate) fn conversation_router(service: Arc<ConversationService>) -> Router {
    Router::new()
        .route("/api/v1/tests", get(list_tests))
        .route("/api/v1/chats/:chat_id/messages", post(post_message))
        .route("/api/v1/chats/:chat_id", delete(cancel_chat))
        .route("/api/v1/score", post(score_endpoint))
        .with_state(service)
}

pub(crate) fn with_conversation_routes(service: Arc<ConversationService>) -> Router {
    conversation_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_tests(
    State(service): State<Arc<ConversationService>>,
) -> Json<Vec<TestSummary>> {
    Json(service.catalog().summaries())
}

pub(crate) async fn post_message(
    State(service): State<Arc<ConversationService>>,
    Path(chat_id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Json<Reply> {
    let chat = ChatId(chat_id);
    Json(service.handle(&chat, &payload.text))
}

pub(crate) async fn cancel_chat(
    State(service): State<Arc<ConversationService>>,
    Path(chat_id): Path<String>,
) -> Json<Reply> {
    Json(service.cancel(&ChatId(chat_id)))
}

pub(crate) async fn score_endpoint(
    State(service): State<Arc<ConversationService>>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<DiagnosisOutcome>, AppError> {
    let ScoreRequest { test, answers } = payload;
    if test.trim().is_empty() {
        return Err(AppError::BadRequest("test name or command is required".to_string()));
    }
    let Some(definition) = service.catalog().resolve(&test) else {
        return Err(AppError::UnknownTest(test));
    };

    Ok(Json(score_answers(definition, answers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use chrono::Duration;
    use medscore::catalog::TestCatalog;
    use medscore::diagnosis::{DiagnosticTest, Question};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn build_service() -> Arc<ConversationService> {
        let test = DiagnosticTest::new(
            "Toy score",
            vec![Question::new("Q1", "p1", [("A", 1), ("B", 2)])],
            [("0-1", "Mild"), ("2-3", "Severe")],
        )
        .with_command("/toy");
        let catalog = TestCatalog::new(vec![test]);
        Arc::new(ConversationService::new(
            Arc::new(catalog),
            Duration::minutes(10),
        ))
    }

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    async fn read_json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let response = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(app_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn list_tests_returns_summaries() {
        let Json(tests) = list_tests(State(build_service())).await;
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].command, "/toy");
        assert_eq!(tests[0].questions, 1);
    }

    #[tokio::test]
    async fn chat_route_runs_a_test_to_completion() {
        let router = conversation_router(build_service());

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/chats/42/messages",
                json!({ "text": "/toy" }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let question = read_json_body(response).await;
        assert_eq!(question["kind"], "question");
        assert!(question.get("outcome").is_none());

        let response = router
            .oneshot(json_request(
                "POST",
                "/api/v1/chats/42/messages",
                json!({ "text": "2" }),
            ))
            .await
            .expect("route executes");
        let done = read_json_body(response).await;
        assert_eq!(done["kind"], "completed");
        assert_eq!(done["outcome"]["total_score"], 2);
        assert_eq!(done["outcome"]["diagnosis"], "Severe");
    }

    #[tokio::test]
    async fn delete_route_cancels_the_session() {
        let service = build_service();
        service.handle(&ChatId::from("7"), "/toy");
        assert!(service.registry().contains(&ChatId::from("7")));

        let response = conversation_router(service.clone())
            .oneshot(
                Request::delete("/api/v1/chats/7")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(read_json_body(response).await["kind"], "cancelled");
        assert!(service.registry().is_empty());
    }

    #[tokio::test]
    async fn score_endpoint_resolves_name_or_command() {
        let request = ScoreRequest {
            test: "/toy".to_string(),
            answers: HashMap::from([("p1".to_string(), 1)]),
        };
        let Json(outcome) = score_endpoint(State(build_service()), Json(request))
            .await
            .expect("known test scores");

        assert_eq!(outcome.test_name, "Toy score");
        assert_eq!(outcome.total_score, 1);
        assert_eq!(outcome.diagnosis, "Mild");
        assert_eq!(outcome.mortality_risk, "unknown");
    }

    #[tokio::test]
    async fn score_endpoint_saturates_oversized_totals() {
        let request = ScoreRequest {
            test: "Toy score".to_string(),
            answers: HashMap::from([("p1".to_string(), i32::MAX), ("extra".to_string(), 1)]),
        };
        let Json(outcome) = score_endpoint(State(build_service()), Json(request))
            .await
            .expect("oversized answers still score");

        assert_eq!(outcome.total_score, i32::MAX);
        assert_eq!(outcome.diagnosis, "undetermined");
    }

    #[tokio::test]
    async fn score_route_rejects_blank_test_names() {
        let response = conversation_router(build_service())
            .oneshot(json_request(
                "POST",
                "/api/v1/score",
                json!({ "test": "  ", "answers": { "p1": 1 } }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json_body(response).await;
        assert_eq!(body["error"], "bad request: test name or command is required");
    }

    #[tokio::test]
    async fn score_route_returns_not_found_for_unknown_tests() {
        let response = conversation_router(build_service())
            .oneshot(json_request(
                "POST",
                "/api/v1/score",
                json!({ "test": "SOFA", "answers": {} }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json_body(response).await;
        assert_eq!(body["error"], "test 'SOFA' is not available");
    }
}
