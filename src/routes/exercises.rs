//! # 종목 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/exercises | `list_exercises` | 내 메뉴/워크아웃에 나온 종목 (이름순) |

use crate::{db, error::AppError, middleware::auth::AuthUser, routes::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /api/v1/exercises` → `{ "exercises": [{ "id", "name" }] }`
///
/// 종목 자체는 이름 하나당 한 행으로 공유되지만, 목록은 요청한 사용자가
/// 쓴 적 있는 종목으로 한정합니다.
pub async fn list_exercises(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let exercises = db::list_exercises(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "exercises": exercises })))
}
