//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 공유 상태(`AppState`), 라우터 조립을 담당합니다.
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (인증 없음)
//! - `volume`: 주간 볼륨 요약, 기간 통계, 재계산
//! - `menus`: 훈련 메뉴와 종목별 최근 기록
//! - `exercises`: 종목 목록
//! - `workouts`: 워크아웃과 세트 기록

pub mod exercises;
pub mod health;
pub mod menus;
pub mod volume;
pub mod workouts;

use crate::services::{OneRepMaxFormula, SummaryService};
use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// 애플리케이션 공유 상태
///
/// 모든 필드가 Arc 기반이라 요청마다 clone해도 비용이 작습니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 검증 키
    pub jwt_secret: String,
    /// 세트를 쓰는 경로가 집계를 다시 만들 때 쓰는 1RM 계산식
    pub formula: Arc<dyn OneRepMaxFormula>,
    pub summary: SummaryService,
}

/// `/api/v1` 아래의 모든 라우트
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/weekly-volume", get(volume::list_weekly_volumes))
        .route("/weekly-volume/stats", get(volume::get_weekly_volume_stats))
        .route("/weekly-volume/recalculate", post(volume::recalculate_weekly_volume))
        .route("/weekly-volume/{week}", get(volume::get_weekly_volume))
        .route("/weekly-summary/current", get(volume::get_current_week_summary))
        .route("/menus", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/menus/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/menus/{id}/exercises/last-records", get(menus::get_last_records))
        .route("/exercises", get(exercises::list_exercises))
        .route("/workouts", get(workouts::list_workouts).post(workouts::create_workout))
        .route("/workouts/{id}", get(workouts::get_workout))
        .route("/sets/{id}", patch(workouts::update_set))
        .route("/health", get(health::health_check))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
