//! # 메뉴 데이터베이스 쿼리 모듈
//!
//! ## 테이블 구조
//! - `exercises`: 종목 (이름 UNIQUE)
//! - `menus`: 사용자별 훈련 메뉴
//! - `menu_items`: 메뉴에 포함된 종목과 계획 세트/반복 수

use crate::db::format_timestamp;
use crate::db::workouts::list_sets;
use crate::error::AppError;
use crate::models::*;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

/// 이름으로 종목을 찾고, 없으면 만듭니다. 종목 ID를 반환합니다.
pub async fn find_or_create_exercise(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<String, sqlx::Error> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO exercises (id, name) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
        .bind(&id)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let (id,): (String,) = sqlx::query_as("SELECT id FROM exercises WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

/// 메뉴 항목 하나의 계획 세트 수 상한. 워크아웃 시작 시 이만큼 세트 행을 만듭니다.
pub const MAX_PLANNED_SETS: i64 = 100;
/// 세트 한 줄의 반복 수 상한 (계획, 기록 공통)
pub const MAX_REPS: i64 = 1000;
/// 메뉴 항목 수, 워크아웃에 한 번에 넣는 종목 수의 상한
pub const MAX_ITEMS: usize = 50;

/// 메뉴 요청을 검증하고 공백을 뗀 이름을 돌려줍니다.
fn validate_menu(req: &CreateMenuRequest) -> Result<&str, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Menu name is required".to_string()));
    }
    if req.items.is_empty() {
        return Err(AppError::BadRequest("Menu needs at least one item".to_string()));
    }
    if req.items.len() > MAX_ITEMS {
        return Err(AppError::BadRequest(format!(
            "Menu can have at most {} items",
            MAX_ITEMS
        )));
    }
    for item in &req.items {
        if item.exercise_name.trim().is_empty() {
            return Err(AppError::BadRequest("exercise_name is required".to_string()));
        }
        if item.set_order < 1 {
            return Err(AppError::BadRequest("set_order must be 1 or greater".to_string()));
        }
        let sets = item.planned_sets.unwrap_or(1);
        let reps = item.planned_reps.unwrap_or(0);
        if !(0..=MAX_PLANNED_SETS).contains(&sets) {
            return Err(AppError::BadRequest(format!(
                "planned_sets must be between 0 and {}",
                MAX_PLANNED_SETS
            )));
        }
        if !(0..=MAX_REPS).contains(&reps) {
            return Err(AppError::BadRequest(format!(
                "planned_reps must be between 0 and {}",
                MAX_REPS
            )));
        }
    }
    Ok(name)
}

async fn insert_items(
    conn: &mut SqliteConnection,
    menu_id: &str,
    items: &[MenuItemInput],
) -> Result<(), sqlx::Error> {
    for item in items {
        let exercise_id = find_or_create_exercise(conn, item.exercise_name.trim()).await?;
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, menu_id, exercise_id, set_order, planned_sets, planned_reps)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(menu_id)
        .bind(&exercise_id)
        .bind(item.set_order)
        .bind(item.planned_sets.unwrap_or(1))
        .bind(item.planned_reps.unwrap_or(0))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// 메뉴와 항목을 한 트랜잭션으로 만듭니다.
pub async fn create_menu(
    pool: &SqlitePool,
    user_id: &str,
    req: &CreateMenuRequest,
) -> Result<MenuResponse, AppError> {
    let name = validate_menu(req)?;

    let id = uuid::Uuid::now_v7().to_string();
    let now = format_timestamp(Utc::now());

    // tx가 커밋 전에 drop되면 롤백됩니다.
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO menus (id, user_id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(name)
    .bind(&req.description)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    insert_items(&mut tx, &id, &req.items).await?;

    tx.commit().await?;
    tracing::info!(user_id, menu_id = %id, items = req.items.len(), "Menu created");

    get_menu(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created menu".to_string()))
}

/// 메뉴 이름, 설명, 항목 전체를 한 트랜잭션으로 바꿉니다.
///
/// 이미 기록한 워크아웃의 세트는 그대로 둡니다.
/// 메뉴가 없거나 다른 사용자의 것이면 `Ok(None)`.
pub async fn update_menu(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    req: &CreateMenuRequest,
) -> Result<Option<MenuResponse>, AppError> {
    let name = validate_menu(req)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE menus SET name = ?, description = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(name)
    .bind(&req.description)
    .bind(format_timestamp(Utc::now()))
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    sqlx::query("DELETE FROM menu_items WHERE menu_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_items(&mut tx, id, &req.items).await?;

    tx.commit().await?;
    tracing::info!(user_id, menu_id = %id, items = req.items.len(), "Menu updated");

    get_menu(pool, id, user_id).await
}

/// 메뉴와 항목을 삭제합니다.
///
/// ## 반환값
/// - `true`: 삭제됨
/// - `false`: 없거나 다른 사용자의 메뉴
///
/// 이 메뉴로 기록한 워크아웃이 있으면 `Conflict` (기록과 집계를 지키기 위해).
pub async fn delete_menu(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let owned: Option<(String,)> = sqlx::query_as("SELECT id FROM menus WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if owned.is_none() {
        return Ok(false);
    }

    let (workouts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE menu_id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if workouts > 0 {
        return Err(AppError::Conflict(format!(
            "Menu has {} recorded workouts",
            workouts
        )));
    }

    sqlx::query("DELETE FROM menu_items WHERE menu_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM menus WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(user_id, menu_id = %id, "Menu deleted");
    Ok(true)
}

/// 내 메뉴나 워크아웃에 등장한 종목 (이름순)
pub async fn list_exercises(pool: &SqlitePool, user_id: &str) -> Result<Vec<Exercise>, AppError> {
    let exercises = sqlx::query_as::<_, Exercise>(
        r#"
        SELECT e.id, e.name
        FROM exercises e
        WHERE e.id IN (
                SELECT mi.exercise_id
                FROM menu_items mi
                JOIN menus m ON m.id = mi.menu_id
                WHERE m.user_id = ?
            )
           OR e.id IN (
                SELECT s.exercise_id
                FROM sets s
                JOIN workouts w ON w.id = s.workout_id
                WHERE w.user_id = ?
            )
        ORDER BY e.name
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(exercises)
}

/// 메뉴 종목별로, 그 메뉴로 한 가장 최근 워크아웃의 세트를 모읍니다.
///
/// 메뉴가 없거나 다른 사용자의 것이면 `Ok(None)`.
pub async fn last_records_for_menu(
    pool: &SqlitePool,
    menu_id: &str,
    user_id: &str,
) -> Result<Option<Vec<ExerciseLastRecord>>, AppError> {
    let Some(menu) = get_menu(pool, menu_id, user_id).await? else {
        return Ok(None);
    };

    let latest: Option<(String, String)> = sqlx::query_as(
        r#"
        SELECT id, started_at
        FROM workouts
        WHERE menu_id = ? AND user_id = ?
        ORDER BY started_at DESC, created_at DESC
        LIMIT 1
        "#,
    )
    .bind(menu_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let (date, sets) = match latest {
        Some((workout_id, started_at)) => (Some(started_at), list_sets(pool, &workout_id).await?),
        None => {
            tracing::debug!(user_id, menu_id, "No workout recorded for menu yet");
            (None, Vec::new())
        }
    };

    // 같은 종목이 메뉴에 두 번 있어도 한 번만
    let mut seen = std::collections::HashSet::new();
    let records = menu
        .items
        .into_iter()
        .filter(|item| seen.insert(item.exercise_id.clone()))
        .map(|item| ExerciseLastRecord {
            sets: sets
                .iter()
                .filter(|s| s.exercise_id == item.exercise_id)
                .cloned()
                .collect(),
            date: date.clone(),
            exercise_id: item.exercise_id,
            exercise_name: item.exercise_name,
        })
        .collect();

    Ok(Some(records))
}

pub async fn list_menus(pool: &SqlitePool, user_id: &str) -> Result<Vec<Menu>, AppError> {
    let menus = sqlx::query_as::<_, Menu>(
        r#"
        SELECT id, user_id, name, description, created_at, updated_at
        FROM menus
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(menus)
}

pub async fn list_menu_items<'e, E>(executor: E, menu_id: &str) -> Result<Vec<MenuItemView>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, MenuItemView>(
        r#"
        SELECT mi.id, mi.exercise_id, e.name AS exercise_name,
               mi.set_order, mi.planned_sets, mi.planned_reps
        FROM menu_items mi
        JOIN exercises e ON e.id = mi.exercise_id
        WHERE mi.menu_id = ?
        ORDER BY mi.set_order
        "#,
    )
    .bind(menu_id)
    .fetch_all(executor)
    .await
}

/// 소유자가 다르면 None (존재 여부를 드러내지 않습니다)
pub async fn get_menu(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<MenuResponse>, AppError> {
    let menu = sqlx::query_as::<_, Menu>(
        r#"
        SELECT id, user_id, name, description, created_at, updated_at
        FROM menus
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(menu) = menu else {
        return Ok(None);
    };
    let items = list_menu_items(pool, &menu.id).await?;

    Ok(Some(MenuResponse { menu, items }))
}
