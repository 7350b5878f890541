//! # 에러 처리 모듈
//!
//! HTTP 계층으로 올라오는 모든 에러를 `AppError` 하나로 모읍니다.
//!
//! - `IntoResponse` 구현: `{ "error": { "code": ..., "message": ... } }` 형태의 JSON 응답
//! - 내부 에러(DB, 집계, 기타)는 상세 내용을 로그에만 남기고 클라이언트에는 일반 메시지만 보냅니다.
//!
//! | variant | 상태 코드 | code |
//! |---|---|---|
//! | `NotFound` | 404 | `not_found` |
//! | `BadRequest` | 400 | `bad_request` |
//! | `Conflict` | 409 | `conflict` |
//! | `Volume` | 500 | `aggregation_failed` |
//! | `Database` | 500 | `database_error` |
//! | `Internal` | 500 | `internal_error` |

use crate::services::volume::VolumeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 리소스가 없거나 다른 사용자의 것 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400). 메시지는 그대로 클라이언트에 전달됩니다.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 현재 상태와 충돌 (HTTP 409). 예: 워크아웃이 남아 있는 메뉴 삭제
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// `?`로 sqlx::Error → AppError::Database 자동 변환
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 주간 볼륨 집계 실패. 로그는 `VolumeError` 생성 시점에 이미 남습니다.
    #[error(transparent)]
    Volume(#[from] VolumeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Volume(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "aggregation_failed",
                "Failed to aggregate weekly volume".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
