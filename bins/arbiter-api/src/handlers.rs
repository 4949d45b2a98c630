// HTTP route handlers for the Arbiter API

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use arbiter_common::types::{ExecutionResult, Question, Submission};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct JudgeRequest {
    pub question: Question,
    pub source: String,
}

/// Envelope shared by every judge response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub code: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            message: "Success".to_string(),
            code: "200_OK".to_string(),
            data: Some(data),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "400_BAD_REQUEST".to_string(),
            data: None,
        }
    }
}

/// POST /judge/test - Run the visible test cases only
pub async fn judge_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JudgeRequest>,
) -> Response {
    run_judge(&state, payload, true).await
}

/// POST /judge/submit - Run every test case, hidden ones included
pub async fn judge_submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JudgeRequest>,
) -> Response {
    run_judge(&state, payload, false).await
}

async fn run_judge(state: &AppState, payload: JudgeRequest, visible_only: bool) -> Response {
    let run_id = Uuid::new_v4();
    let question = payload.question;

    if question.test_cases.is_empty() {
        warn!(run_id = %run_id, question_id = %question.id, "Question has no test cases");
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ExecutionResult>::bad_request(
                "Question has no test cases",
            )),
        )
            .into_response();
    }

    let submission = Submission {
        question_id: question.id.clone(),
        source: payload.source,
        visible_only,
    };

    let start = Instant::now();
    let result = state.judge.run(&submission, &question).await;
    metrics::record(&result, start.elapsed());

    info!(
        run_id = %run_id,
        question_id = %question.id,
        visible_only,
        outcome = metrics::outcome(&result),
        passed = result.passed_tests,
        total = result.total_tests,
        "Judge request served"
    );

    (StatusCode::OK, Json(ApiResponse::success(result))).into_response()
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_export() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_common::config::JudgeConfig;
    use arbiter_common::types::TestCase;
    use arbiter_judge::Judge;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            judge: Judge::javac(&JudgeConfig::default()),
        })
    }

    fn request(source: &str, cases: Vec<TestCase>) -> JudgeRequest {
        JudgeRequest {
            question: Question {
                id: "square".to_string(),
                method_signature: "public static int square(int x)".to_string(),
                test_cases: cases,
                ..Default::default()
            },
            source: source.to_string(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_question_without_cases_is_rejected() {
        let response = judge_submit(State(state()), Json(request("class A {}", vec![]))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "400_BAD_REQUEST");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_security_violation_is_wrapped_in_success_envelope() {
        let case = TestCase {
            id: 1,
            input: "5".to_string(),
            expected_output: "25".to_string(),
            hidden: false,
        };
        let source = "public class Solution { static { Runtime.getRuntime().halt(0); } }";

        let response = judge_test(State(state()), Json(request(source, vec![case]))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Success");
        assert_eq!(body["code"], "200_OK");
        assert_eq!(body["data"]["success"], false);
        assert_eq!(body["data"]["totalTests"], 0);
        assert_eq!(
            body["data"]["error"],
            "Security violation: Forbidden API detected: Runtime.getRuntime()"
        );
    }

    #[test]
    fn test_request_deserializes_camel_case_question() {
        let json = r#"{
            "question": {
                "methodSignature": "public static int square(int x)",
                "testCases": [{"id": 1, "input": "5", "expectedOutput": "25"}]
            },
            "source": "public class Solution {}"
        }"#;
        let request: JudgeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.question.test_cases.len(), 1);
        assert!(!request.question.test_cases[0].hidden);
    }
}
