//! # 워크아웃/세트 데이터베이스 쿼리 모듈
//!
//! 세트를 쓰는 모든 경로(워크아웃 생성, 세트 수정)는 같은 트랜잭션 안에서
//! 해당 주의 `weekly_volumes` 행을 다시 만듭니다. 중간에 실패하면 트랜잭션이
//! 커밋되지 않은 채 drop되어 세트와 집계가 함께 롤백됩니다.

use crate::db::menus::{find_or_create_exercise, list_menu_items, MAX_ITEMS, MAX_PLANNED_SETS, MAX_REPS};
use crate::db::volume::rebuild_week_in_tx;
use crate::db::format_timestamp;
use crate::error::AppError;
use crate::models::*;
use crate::services::numeric::decimal_from_float;
use crate::services::one_rep_max::OneRepMaxFormula;
use crate::services::week::{is_supported, week_start};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

const SET_COLUMNS: &str = r#"
    SELECT s.id, s.workout_id, s.exercise_id, e.name AS exercise_name, s.set_order,
           s.weight_kg, s.reps, s.rir, s.rpe, s.updated_at
    FROM sets s
    JOIN exercises e ON e.id = s.exercise_id
"#;

/// 중량은 소수 2자리, RIR/RPE는 소수 1자리로 저장합니다.
fn decimal_text(value: f64, scale: u32, field: &str) -> Result<String, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::BadRequest(format!("{} must be a non-negative number", field)));
    }
    decimal_from_float(value, scale)
        .map(|d| d.to_string())
        .ok_or_else(|| AppError::BadRequest(format!("{} is out of range", field)))
}

fn optional_decimal_text(value: Option<f64>, scale: u32, field: &str) -> Result<Option<String>, AppError> {
    value.map(|v| decimal_text(v, scale, field)).transpose()
}

fn check_reps(reps: i64) -> Result<(), AppError> {
    if !(0..=MAX_REPS).contains(&reps) {
        return Err(AppError::BadRequest(format!("reps must be between 0 and {}", MAX_REPS)));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_set(
    conn: &mut SqliteConnection,
    workout_id: &str,
    exercise_id: &str,
    set_order: i64,
    weight_kg: Option<&str>,
    reps: i64,
    rir: Option<&str>,
    rpe: Option<&str>,
    now: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sets (id, workout_id, exercise_id, set_order, weight_kg, reps, rir, rpe, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(workout_id)
    .bind(exercise_id)
    .bind(set_order)
    .bind(weight_kg)
    .bind(reps)
    .bind(rir)
    .bind(rpe)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// 검증을 통과한 세트 한 줄
struct NewSet {
    weight_kg: String,
    reps: i64,
    rir: Option<String>,
    rpe: Option<String>,
}

/// 워크아웃을 시작합니다.
///
/// ## 처리 흐름
/// 1. 메뉴 소유권 확인 (다른 사용자의 메뉴면 404)
/// 2. 워크아웃 INSERT
/// 3. 세트 INSERT: `exercises`가 있으면 그 기록을, 없으면 메뉴 계획대로 빈 세트를
/// 4. `started_at`이 속한 주의 집계 재계산
/// 5. 커밋 후 세트 포함 워크아웃 반환
pub async fn create_workout(
    pool: &SqlitePool,
    formula: &dyn OneRepMaxFormula,
    user_id: &str,
    req: &CreateWorkoutRequest,
) -> Result<WorkoutResponse, AppError> {
    let supplied = match req.exercises.as_deref() {
        Some(exercises) if !exercises.is_empty() => {
            if exercises.len() > MAX_ITEMS {
                return Err(AppError::BadRequest(format!(
                    "A workout can have at most {} exercises",
                    MAX_ITEMS
                )));
            }
            let mut validated = Vec::with_capacity(exercises.len());
            for exercise in exercises {
                if exercise.exercise_name.trim().is_empty() {
                    return Err(AppError::BadRequest("exercise_name is required".to_string()));
                }
                if exercise.sets.len() > MAX_PLANNED_SETS as usize {
                    return Err(AppError::BadRequest(format!(
                        "An exercise can have at most {} sets",
                        MAX_PLANNED_SETS
                    )));
                }
                let mut sets = Vec::with_capacity(exercise.sets.len());
                for set in &exercise.sets {
                    check_reps(set.reps)?;
                    sets.push(NewSet {
                        weight_kg: decimal_text(set.weight_kg, 2, "weight_kg")?,
                        reps: set.reps,
                        rir: optional_decimal_text(set.rir, 1, "rir")?,
                        rpe: optional_decimal_text(set.rpe, 1, "rpe")?,
                    });
                }
                validated.push((exercise.exercise_name.trim(), sets));
            }
            Some(validated)
        }
        _ => None,
    };

    let started_at = req.started_at.unwrap_or_else(Utc::now);
    if !is_supported(started_at) {
        return Err(AppError::BadRequest(
            "started_at must fall between 0001-01-01 and 9999-12-26".to_string(),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let now = format_timestamp(Utc::now());

    let mut tx = pool.begin().await?;

    let owned: Option<(String,)> = sqlx::query_as("SELECT id FROM menus WHERE id = ? AND user_id = ?")
        .bind(&req.menu_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if owned.is_none() {
        return Err(AppError::NotFound);
    }

    sqlx::query(
        "INSERT INTO workouts (id, user_id, menu_id, started_at, note, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.menu_id)
    .bind(format_timestamp(started_at))
    .bind(&req.note)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    let mut set_order = 0i64;
    match supplied {
        Some(exercises) => {
            for (name, sets) in exercises {
                let exercise_id = find_or_create_exercise(&mut tx, name).await?;
                for set in sets {
                    set_order += 1;
                    insert_set(
                        &mut tx,
                        &id,
                        &exercise_id,
                        set_order,
                        Some(&set.weight_kg),
                        set.reps,
                        set.rir.as_deref(),
                        set.rpe.as_deref(),
                        &now,
                    )
                    .await?;
                }
            }
        }
        None => {
            for item in list_menu_items(&mut *tx, &req.menu_id).await? {
                for _ in 0..item.planned_sets.clamp(0, MAX_PLANNED_SETS) {
                    set_order += 1;
                    insert_set(
                        &mut tx,
                        &id,
                        &item.exercise_id,
                        set_order,
                        None,
                        item.planned_reps,
                        None,
                        None,
                        &now,
                    )
                    .await?;
                }
            }
        }
    }

    rebuild_week_in_tx(&mut tx, user_id, week_start(started_at), formula).await?;
    tx.commit().await?;

    tracing::info!(user_id, workout_id = %id, sets = set_order, "Workout started");

    get_workout(pool, &id, user_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created workout".to_string()))
}

pub async fn list_workouts(pool: &SqlitePool, user_id: &str) -> Result<Vec<WorkoutSummary>, AppError> {
    let workouts = sqlx::query_as::<_, WorkoutSummary>(
        r#"
        SELECT w.id, w.menu_id, m.name AS menu_name, w.started_at, w.note
        FROM workouts w
        JOIN menus m ON m.id = w.menu_id
        WHERE w.user_id = ?
        ORDER BY w.started_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(workouts)
}

pub async fn get_workout(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<WorkoutResponse>, AppError> {
    let workout = sqlx::query_as::<_, Workout>(
        r#"
        SELECT id, user_id, menu_id, started_at, note, created_at
        FROM workouts
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(workout) = workout else {
        return Ok(None);
    };
    let sets = list_sets(pool, &workout.id).await?;

    Ok(Some(WorkoutResponse { workout, sets }))
}

pub async fn list_sets(pool: &SqlitePool, workout_id: &str) -> Result<Vec<SetView>, AppError> {
    let sql = format!("{} WHERE s.workout_id = ? ORDER BY s.set_order", SET_COLUMNS);
    let sets = sqlx::query_as::<_, SetRecord>(&sql)
        .bind(workout_id)
        .fetch_all(pool)
        .await?;

    Ok(sets.into_iter().map(SetView::from).collect())
}

async fn get_set(pool: &SqlitePool, id: &str) -> Result<Option<SetView>, AppError> {
    let sql = format!("{} WHERE s.id = ?", SET_COLUMNS);
    let set = sqlx::query_as::<_, SetRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(set.map(SetView::from))
}

/// 세트를 부분 수정하고 해당 주의 집계를 다시 만듭니다.
///
/// 세트가 없거나 다른 사용자의 것이면 `Ok(None)`.
pub async fn update_set(
    pool: &SqlitePool,
    formula: &dyn OneRepMaxFormula,
    user_id: &str,
    set_id: &str,
    req: &UpdateSetRequest,
) -> Result<Option<SetView>, AppError> {
    let weight_kg = optional_decimal_text(req.weight_kg, 2, "weight_kg")?;
    let rir = optional_decimal_text(req.rir, 1, "rir")?;
    let rpe = optional_decimal_text(req.rpe, 1, "rpe")?;
    if let Some(reps) = req.reps {
        check_reps(reps)?;
    }

    let mut tx = pool.begin().await?;

    let started_at: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT w.started_at
        FROM sets s
        JOIN workouts w ON w.id = s.workout_id
        WHERE s.id = ? AND w.user_id = ?
        "#,
    )
    .bind(set_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((started_at,)) = started_at else {
        return Ok(None);
    };
    let started_at = DateTime::parse_from_rfc3339(&started_at)
        .map_err(|e| AppError::Internal(format!("Invalid workout start {}: {}", started_at, e)))?
        .with_timezone(&Utc);

    sqlx::query(
        r#"
        UPDATE sets SET
            weight_kg = COALESCE(?, weight_kg),
            reps = COALESCE(?, reps),
            rir = COALESCE(?, rir),
            rpe = COALESCE(?, rpe),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&weight_kg)
    .bind(req.reps)
    .bind(&rir)
    .bind(&rpe)
    .bind(format_timestamp(Utc::now()))
    .bind(set_id)
    .execute(&mut *tx)
    .await?;

    rebuild_week_in_tx(&mut tx, user_id, week_start(started_at), formula).await?;
    tx.commit().await?;

    get_set(pool, set_id).await
}
