//! # 주간 볼륨 저장소 (SQLite)
//!
//! `services::volume::VolumeStore`의 SQLite 구현입니다.
//!
//! ## 테이블
//! - `weekly_volumes`: (user_id, week_start_date) 단위 집계. 세트/워크아웃에서 언제든 다시 만들 수 있습니다.
//! - `sets` ⋈ `workouts`: 재계산의 원천 데이터
//!
//! 재계산은 한 트랜잭션 안에서 "원시 세트 조회 → 요약 → upsert"를 수행합니다.
//! 수행한 세트가 하나도 없는 주는 행을 지워서, 조회 시 0 값 요약으로 보이게 합니다.

use crate::db::{format_date, format_timestamp, DATE_FORMAT};
use crate::models::*;
use crate::services::numeric::parse_decimal;
use crate::services::one_rep_max::OneRepMaxFormula;
use crate::services::volume::{summarize_week, VolumeStore};
use crate::services::week::{is_supported, next_week_start, week_start, week_start_at_midnight};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool, TypeInfo, ValueRef};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    formula: Arc<dyn OneRepMaxFormula>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, formula: Arc<dyn OneRepMaxFormula>) -> Self {
        Self { pool, formula }
    }
}

#[derive(sqlx::FromRow)]
struct RawSetRecord {
    exercise_id: String,
    weight_kg: Option<String>,
    reps: i64,
}

impl From<RawSetRecord> for RawSetRow {
    fn from(r: RawSetRecord) -> Self {
        RawSetRow {
            weight_kg: parse_decimal(r.weight_kg.as_deref(), "weight_kg"),
            exercise_id: r.exercise_id,
            reps: r.reps,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserSetRecord {
    user_id: String,
    started_at: String,
    exercise_id: String,
    weight_kg: Option<String>,
    reps: i64,
}

fn parse_week(raw: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn weekly_row_from(row: &SqliteRow) -> Result<WeeklyVolumeRow, sqlx::Error> {
    let week: String = row.try_get("week_start_date")?;
    let total: Option<String> = row.try_get("total_volume")?;
    let one_rm: Option<String> = row.try_get("est_one_rm")?;

    Ok(WeeklyVolumeRow {
        week_start_date: parse_week(&week)?,
        total_volume: parse_decimal(total.as_deref(), "total_volume"),
        est_one_rm: parse_decimal(one_rm.as_deref(), "est_one_rm"),
        exercise_count: row.try_get("exercise_count")?,
        set_count: row.try_get("set_count")?,
    })
}

/// 집계 함수 결과 컬럼을 저장 타입에 따라 `NumericValue`로 읽습니다.
fn numeric_column(row: &SqliteRow, name: &str) -> Result<NumericValue, sqlx::Error> {
    let kind = {
        let raw = row.try_get_raw(name)?;
        if raw.is_null() {
            return Ok(NumericValue::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match kind.as_str() {
        "INTEGER" => NumericValue::Integer(row.try_get(name)?),
        "REAL" => NumericValue::Float(row.try_get(name)?),
        "TEXT" => {
            let text: String = row.try_get(name)?;
            match text.trim().parse::<Decimal>() {
                Ok(d) => NumericValue::Decimal(d),
                Err(_) => NumericValue::Text(text),
            }
        }
        _ => NumericValue::Unsupported(kind),
    };
    Ok(value)
}

async fn upsert_week(
    conn: &mut SqliteConnection,
    user_id: &str,
    week: NaiveDate,
    agg: &WeeklyAggregate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO weekly_volumes
            (user_id, week_start_date, total_volume, est_one_rm, exercise_count, set_count, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, week_start_date) DO UPDATE SET
            total_volume = excluded.total_volume,
            est_one_rm = excluded.est_one_rm,
            exercise_count = excluded.exercise_count,
            set_count = excluded.set_count,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(format_date(week))
    .bind(agg.total_volume.to_string())
    .bind(agg.est_one_rm.to_string())
    .bind(agg.exercise_count)
    .bind(agg.set_count)
    .bind(format_timestamp(Utc::now()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 열린 트랜잭션(또는 연결) 안에서 (사용자, 주) 하나의 집계를 다시 만듭니다.
///
/// 세트 수정, 워크아웃 생성과 같은 트랜잭션에서 호출되므로 커밋하지 않습니다.
pub async fn rebuild_week_in_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    week: NaiveDate,
    formula: &dyn OneRepMaxFormula,
) -> Result<WeeklyAggregate, sqlx::Error> {
    let start = week_start_at_midnight(week);
    let end = match next_week_start(week) {
        Some(end) if is_supported(start) => week_start_at_midnight(end),
        _ => {
            return Err(sqlx::Error::Protocol(format!(
                "week {} is outside the storable range",
                week
            )))
        }
    };
    let from = format_timestamp(start);
    let to = format_timestamp(end);

    let sets: Vec<RawSetRow> = sqlx::query_as::<_, RawSetRecord>(
        r#"
        SELECT s.exercise_id, s.weight_kg, s.reps
        FROM sets s
        JOIN workouts w ON w.id = s.workout_id
        WHERE w.user_id = ? AND w.started_at >= ? AND w.started_at < ?
        "#,
    )
    .bind(user_id)
    .bind(&from)
    .bind(&to)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(RawSetRow::from)
    .collect();

    let agg = summarize_week(&sets, formula);

    if agg.set_count == 0 {
        sqlx::query("DELETE FROM weekly_volumes WHERE user_id = ? AND week_start_date = ?")
            .bind(user_id)
            .bind(format_date(week))
            .execute(&mut *conn)
            .await?;
    } else {
        upsert_week(conn, user_id, week, &agg).await?;
    }

    tracing::debug!(
        user_id,
        week_start = %week,
        set_count = agg.set_count,
        total_volume = %agg.total_volume,
        "Rebuilt weekly volume"
    );
    Ok(agg)
}

#[async_trait]
impl VolumeStore for SqliteStore {
    async fn fetch_recent_weekly_rows(
        &self,
        user_id: &str,
        current_week: NaiveDate,
        weeks_count: i64,
    ) -> Result<Vec<WeeklyVolumeRow>, sqlx::Error> {
        let oldest = Duration::try_weeks(weeks_count.saturating_sub(1).max(0))
            .and_then(|span| current_week.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);

        let rows = sqlx::query(
            r#"
            SELECT week_start_date, total_volume, est_one_rm, exercise_count, set_count
            FROM weekly_volumes
            WHERE user_id = ? AND week_start_date BETWEEN ? AND ?
            ORDER BY week_start_date DESC
            "#,
        )
        .bind(user_id)
        .bind(format_date(oldest))
        .bind(format_date(current_week))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(weekly_row_from).collect()
    }

    async fn fetch_week_row(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyVolumeRow>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT week_start_date, total_volume, est_one_rm, exercise_count, set_count
            FROM weekly_volumes
            WHERE user_id = ? AND week_start_date = ?
            "#,
        )
        .bind(user_id)
        .bind(format_date(week_start))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(weekly_row_from).transpose()
    }

    async fn fetch_stats_row(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeeklyVolumeStatsRow, sqlx::Error> {
        // 집계 함수만 있으므로 대상 주가 없어도 NULL로 채워진 한 행이 나옵니다.
        let row = sqlx::query(
            r#"
            SELECT
                AVG(CAST(total_volume AS REAL)) AS avg_weekly_volume,
                MAX(CAST(total_volume AS NUMERIC)) AS max_weekly_volume,
                MIN(CAST(total_volume AS NUMERIC)) AS min_weekly_volume,
                MAX(CAST(est_one_rm AS NUMERIC)) AS max_est_one_rm,
                AVG(exercise_count) AS avg_exercise_count,
                AVG(set_count) AS avg_set_count
            FROM weekly_volumes
            WHERE user_id = ? AND week_start_date BETWEEN ? AND ?
            "#,
        )
        .bind(user_id)
        .bind(format_date(start))
        .bind(format_date(end))
        .fetch_one(&self.pool)
        .await?;

        Ok(WeeklyVolumeStatsRow {
            avg_weekly_volume: row.try_get("avg_weekly_volume")?,
            max_weekly_volume: numeric_column(&row, "max_weekly_volume")?,
            min_weekly_volume: numeric_column(&row, "min_weekly_volume")?,
            max_est_one_rm: numeric_column(&row, "max_est_one_rm")?,
            avg_exercise_count: row.try_get("avg_exercise_count")?,
            avg_set_count: row.try_get("avg_set_count")?,
        })
    }

    async fn rebuild_week(&self, user_id: &str, week_start: NaiveDate) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        rebuild_week_in_tx(&mut tx, user_id, week_start, self.formula.as_ref()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn refresh_all_aggregates(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let records = sqlx::query_as::<_, UserSetRecord>(
            r#"
            SELECT w.user_id, w.started_at, s.exercise_id, s.weight_kg, s.reps
            FROM sets s
            JOIN workouts w ON w.id = s.workout_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut weeks: BTreeMap<(String, NaiveDate), Vec<RawSetRow>> = BTreeMap::new();
        for r in records {
            let started_at = match DateTime::parse_from_rfc3339(&r.started_at) {
                Ok(t) => t.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(user_id = %r.user_id, started_at = %r.started_at, error = %e, "Unparseable workout start, skipping set");
                    continue;
                }
            };
            weeks
                .entry((r.user_id, week_start(started_at)))
                .or_default()
                .push(RawSetRow {
                    exercise_id: r.exercise_id,
                    weight_kg: parse_decimal(r.weight_kg.as_deref(), "weight_kg"),
                    reps: r.reps,
                });
        }

        sqlx::query("DELETE FROM weekly_volumes")
            .execute(&mut *tx)
            .await?;

        let mut written = 0usize;
        for ((user_id, week), sets) in &weeks {
            let agg = summarize_week(sets, self.formula.as_ref());
            if agg.set_count == 0 {
                continue;
            }
            upsert_week(&mut tx, user_id, *week, &agg).await?;
            written += 1;
        }

        tx.commit().await?;
        tracing::debug!(weeks = written, "Refreshed all weekly volume aggregates");
        Ok(())
    }
}
