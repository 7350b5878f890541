//! # 워크아웃/세트 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/workouts | `list_workouts` | 내 워크아웃 목록 (최신순) |
//! | POST | /api/v1/workouts | `create_workout` | 워크아웃 시작 |
//! | GET | /api/v1/workouts/{id} | `get_workout` | 워크아웃 상세 (세트 포함) |
//! | PATCH | /api/v1/sets/{id} | `update_set` | 세트 기록 수정 |
//!
//! 세트를 쓰는 요청은 해당 주의 볼륨 집계를 같은 트랜잭션에서 갱신합니다.

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /api/v1/workouts` → `{ "workouts": [...] }` (메뉴 이름 포함, 최신순)
pub async fn list_workouts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let workouts = db::list_workouts(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "workouts": workouts })))
}

/// `POST /api/v1/workouts` → `201 Created` + 세트가 포함된 워크아웃
///
/// `exercises`를 생략하면 메뉴 계획대로 빈 세트를 만듭니다.
/// 다른 사용자의 메뉴로는 시작할 수 없습니다 (404).
pub async fn create_workout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>), AppError> {
    let workout =
        db::create_workout(&state.pool, state.formula.as_ref(), &user.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

/// `GET /api/v1/workouts/{id}` → 워크아웃 + 세트 (`set_order` 순)
pub async fn get_workout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<WorkoutResponse>, AppError> {
    let workout = db::get_workout(&state.pool, &id, &user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(workout))
}

/// `PATCH /api/v1/sets/{id}` → 수정된 세트
///
/// 보낸 필드만 바꾸고, 같은 트랜잭션에서 그 워크아웃 주의 볼륨 집계를 다시 만듭니다.
pub async fn update_set(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateSetRequest>,
) -> Result<Json<SetView>, AppError> {
    let set = db::update_set(&state.pool, state.formula.as_ref(), &user.user_id, &id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(set))
}
