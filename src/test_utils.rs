//! 테스트 공용 헬퍼: 메모리 SQLite, 시드 데이터, 토큰 발급

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// 마이그레이션을 적용한 메모리 SQLite 풀
///
/// `sqlite::memory:`는 연결마다 별도의 DB가 생기므로 연결을 하나로 고정합니다.
pub async fn setup_test_db() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}

/// 항목 없는 메뉴 하나를 만들고 ID를 반환합니다.
pub async fn seed_menu(pool: &SqlitePool, user_id: &str) -> String {
    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO menus (id, user_id, name) VALUES (?, ?, 'Seed menu')")
        .bind(&id)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to seed menu");
    id
}

/// 워크아웃과 세트를 SQL로 직접 넣습니다. 집계는 건드리지 않습니다.
///
/// `sets`: (종목 이름, 중량 TEXT, 반복 수)
pub async fn seed_workout(
    pool: &SqlitePool,
    user_id: &str,
    menu_id: &str,
    started_at: DateTime<Utc>,
    sets: &[(&str, Option<&str>, i64)],
) -> String {
    let workout_id = uuid::Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO workouts (id, user_id, menu_id, started_at) VALUES (?, ?, ?, ?)")
        .bind(&workout_id)
        .bind(user_id)
        .bind(menu_id)
        .bind(crate::db::format_timestamp(started_at))
        .execute(pool)
        .await
        .expect("Failed to seed workout");

    for (i, (exercise, weight, reps)) in sets.iter().enumerate() {
        sqlx::query("INSERT OR IGNORE INTO exercises (id, name) VALUES (?, ?)")
            .bind(uuid::Uuid::now_v7().to_string())
            .bind(*exercise)
            .execute(pool)
            .await
            .expect("Failed to seed exercise");

        sqlx::query(
            r#"
            INSERT INTO sets (id, workout_id, exercise_id, set_order, weight_kg, reps)
            VALUES (?, ?, (SELECT id FROM exercises WHERE name = ?), ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(&workout_id)
        .bind(*exercise)
        .bind(i as i64 + 1)
        .bind(*weight)
        .bind(*reps)
        .execute(pool)
        .await
        .expect("Failed to seed set");
    }

    workout_id
}

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn bearer(user_id: &str) -> String {
    let token = crate::middleware::auth::create_access_token(user_id, TEST_JWT_SECRET)
        .expect("Failed to sign test token");
    format!("Bearer {}", token)
}

/// 테스트용 전체 라우터 (Epley, 기본 12주)
pub fn test_app(pool: SqlitePool) -> axum::Router {
    use crate::db::SqliteStore;
    use crate::routes::{router, AppState};
    use crate::services::one_rep_max::Epley;
    use crate::services::{OneRepMaxFormula, SummaryService, VolumeService};
    use std::sync::Arc;

    let formula: Arc<dyn OneRepMaxFormula> = Arc::new(Epley);
    let store = Arc::new(SqliteStore::new(pool.clone(), formula.clone()));
    let state = AppState {
        pool,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        formula,
        summary: SummaryService::new(VolumeService::new(store), 12),
    };
    router(state)
}

/// 요청 하나를 보내고 (상태, 헤더, JSON 본문)을 돌려줍니다. 빈 본문은 `Value::Null`.
pub async fn send(
    app: &axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, axum::http::HeaderMap, serde_json::Value) {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, headers, body)
}
