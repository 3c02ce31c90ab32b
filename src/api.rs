use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::guardrails::{self, GuardrailConfig, GuardrailReport};
use crate::ml::{self, AnalysisResult, ScoreBreakdown, Sentiment};

#[derive(OpenApi)]
#[openapi(
    info(title = "Sentiment Analyzer", version = "1.0.0"),
    paths(analyze_review),
    components(
        schemas(
            AnalyzeRequest,
            AnalyzeResponse,
            crate::ml::Sentiment,
            crate::ml::ScoreBreakdown,
            crate::guardrails::GuardrailConfig,
            crate::guardrails::GuardrailReport,
            crate::guardrails::GuardrailResult,
            crate::guardrails::GuardrailVerdict
        )
    ),
    tags(
        (name = "sentiment", description = "Review Sentiment API")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Review text. Any string, including empty.
    pub text: String,
    /// Optional content checks to run over the same text.
    #[serde(default)]
    pub guardrails: Option<GuardrailConfig>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub scores: ScoreBreakdown,
    /// Present only when guardrails were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<GuardrailReport>,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            sentiment: result.sentiment,
            confidence: result.confidence,
            scores: result.scores,
            guardrails: None,
        }
    }
}

/// Routes plus API docs, ready to serve.
pub fn router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .route("/analyze", post(analyze_review))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Classify a product review
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Sentiment label with confidence and per-class scores", body = AnalyzeResponse),
        (status = 422, description = "Body is not valid JSON or does not match the schema")
    ),
    tag = "sentiment"
)]
pub async fn analyze_review(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;

    let mut response = AnalyzeResponse::from(ml::analyze(&request.text));
    if let Some(config) = request.guardrails {
        response.guardrails = Some(guardrails::validate(&request.text, &config));
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_analyze(body: Body, content_type: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::POST).uri("/analyze");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(value: Value) -> (StatusCode, Value) {
        post_analyze(Body::from(value.to_string()), Some("application/json")).await
    }

    #[tokio::test]
    async fn analyze_returns_result_shape() {
        let (status, body) = post_json(json!({ "text": "package arrived on time" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentiment"], "NEUTRAL");
        let confidence = body["confidence"].as_f64().unwrap();
        assert!((0.6..=0.8).contains(&confidence));
        assert_eq!(body["scores"]["neutral"].as_f64(), Some(1.0));
        assert!(body["scores"]["positive"].as_f64().unwrap() <= 0.1);
        assert!(body["scores"]["negative"].as_f64().unwrap() <= 0.1);
        assert!(body.get("guardrails").is_none());
    }

    #[tokio::test]
    async fn analyze_positive_review() {
        let (status, body) =
            post_json(json!({ "text": "Great food, amazing service, would recommend" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentiment"], "POSITIVE");
        assert_eq!(body["confidence"].as_f64(), Some(0.99));
        assert_eq!(body["scores"]["neutral"].as_f64(), Some(0.4));
    }

    #[tokio::test]
    async fn analyze_accepts_empty_text() {
        let (status, body) = post_json(json!({ "text": "" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentiment"], "NEUTRAL");
        assert_eq!(body["scores"]["neutral"].as_f64(), Some(1.0));
    }

    #[tokio::test]
    async fn analyze_rejects_missing_text() {
        let (status, body) = post_json(json!({ "review": "great" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn analyze_rejects_wrong_type() {
        let (status, _) = post_json(json!({ "text": 42 })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn analyze_rejects_malformed_json() {
        let (status, body) = post_analyze(Body::from("{\"text\": "), Some("application/json")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn analyze_rejects_missing_content_type() {
        let (status, _) = post_analyze(Body::from(r#"{"text": "good"}"#), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn analyze_with_guardrails() {
        let (status, body) = post_json(json!({
            "text": "I hate it, email me at someone@example.com",
            "guardrails": { "toxicity": true, "pii": true }
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        let report = &body["guardrails"];
        assert!(report["request_id"].is_string());
        assert_eq!(report["results"]["toxicity"]["verdict"], "WARN");
        assert_eq!(report["results"]["pii"]["verdict"], "BLOCK");
        assert!(report["results"].get("prompt_injection").is_none());
    }

    #[tokio::test]
    async fn openapi_document_lists_analyze() {
        let response = router()
            .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["info"]["title"], "Sentiment Analyzer");
        assert!(doc["paths"].get("/analyze").is_some());
    }

    #[tokio::test]
    async fn analyze_only_accepts_post() {
        let response = router()
            .oneshot(Request::builder().uri("/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
