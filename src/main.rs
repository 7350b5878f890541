//! # 주간 훈련 볼륨 서버 진입점
//!
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성 + 마이그레이션
//! 4. 1RM 계산식, 저장소, 서비스 조립
//! 5. 라우터 + CORS + 요청 로깅 미들웨어
//! 6. HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

#[cfg(test)]
mod test_utils;

use anyhow::Result; // main 전용 에러 타입 (어떤 에러든 담아서 출력)
use config::Config;
use routes::AppState;
use services::{formula_by_name, SummaryService, VolumeService};
use sqlx::sqlite::SqlitePoolOptions; // SQLite 연결 풀 설정
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer}, // 교차 출처 요청 허용
    trace::TraceLayer,      // 요청/응답 로깅
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 서버 진입점
///
/// 시작 단계(설정, DB 연결, 마이그레이션, 1RM 계산식 선택) 중 하나라도 실패하면
/// 에러를 출력하고 종료합니다.
#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 시스템 환경변수로 계속 진행합니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 이 크레이트와 HTTP 계층을 debug로 로깅합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weekly_volume=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting weekly volume server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let formula = formula_by_name(&config.one_rm_formula).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown ONE_RM_FORMULA '{}' (expected epley or brzycki)",
            config.one_rm_formula
        )
    })?;
    tracing::info!(formula = formula.name(), default_weeks = config.default_weeks, "Aggregation configured");

    // 저장소 → 집계 엔진 → 요약 서비스 순으로 조립합니다.
    let store = Arc::new(db::SqliteStore::new(pool.clone(), formula.clone()));
    let summary = SummaryService::new(VolumeService::new(store), config.default_weeks);

    let state = AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
        formula,
        summary,
    };

    // 프로덕션에서는 허용 출처를 좁혀야 합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
