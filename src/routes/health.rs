//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /api/v1/health` → `{ "status": "ok" }` (인증 없음)

use axum::Json; // JSON 응답 래퍼
use serde_json::{json, Value};

/// `GET /health`: 서버 상태를 확인합니다.
///
/// State나 인증 없이 고정된 JSON만 반환하므로 실패하지 않습니다.
/// 로드밸런서나 컨테이너 헬스체크에서 DB 상태와 무관하게 프로세스 생존만 확인할 때 씁니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
