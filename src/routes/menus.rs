//! # 메뉴 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/menus | `list_menus` | 내 메뉴 목록 (최신순) |
//! | POST | /api/v1/menus | `create_menu` | 메뉴 + 항목 생성 |
//! | GET | /api/v1/menus/{id} | `get_menu` | 메뉴 상세 (항목 포함) |
//! | PUT | /api/v1/menus/{id} | `update_menu` | 이름, 설명, 항목 전체 교체 |
//! | DELETE | /api/v1/menus/{id} | `delete_menu` | 메뉴 삭제 (워크아웃이 있으면 409) |
//! | GET | /api/v1/menus/{id}/exercises/last-records | `get_last_records` | 종목별 최근 워크아웃 세트 |
//!
//! 다른 사용자의 메뉴는 존재하지 않는 것처럼 404를 돌려줍니다.

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /api/v1/menus` → `{ "menus": [...] }`
///
/// 항목은 포함하지 않습니다. 상세는 `GET /menus/{id}`로 조회합니다.
pub async fn list_menus(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let menus = db::list_menus(&state.pool, &user.user_id).await?;
    Ok(Json(json!({ "menus": menus })))
}

/// `POST /api/v1/menus` → `201 Created` + 생성된 메뉴
pub async fn create_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuResponse>), AppError> {
    let menu = db::create_menu(&state.pool, &user.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

/// `GET /api/v1/menus/{id}` → 메뉴 + 항목
pub async fn get_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MenuResponse>, AppError> {
    let menu = db::get_menu(&state.pool, &id, &user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(menu))
}

/// `PUT /api/v1/menus/{id}` → 수정된 메뉴
///
/// 본문은 생성 요청과 같고, 항목 목록 전체를 새 목록으로 바꿉니다.
pub async fn update_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CreateMenuRequest>,
) -> Result<Json<MenuResponse>, AppError> {
    let menu = db::update_menu(&state.pool, &id, &user.user_id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(menu))
}

/// `DELETE /api/v1/menus/{id}` → `204 No Content`
pub async fn delete_menu(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = db::delete_menu(&state.pool, &id, &user.user_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/menus/{id}/exercises/last-records` → `{ "records": [...] }`
///
/// 워크아웃 시작 화면에서 지난번 중량/반복 수를 보여줄 때 씁니다.
pub async fn get_last_records(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let records = db::last_records_for_menu(&state.pool, &id, &user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(json!({ "records": records })))
}
