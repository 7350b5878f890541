//! # 주간 볼륨 집계 엔진
//!
//! 원시 세트 기록에서 주 단위 요약(총 볼륨, 추정 1RM, 종목 수, 세트 수)을 만들고,
//! 기간 통계(평균/최소/최대)와 재계산 트리거를 제공합니다.
//!
//! 저장소는 `VolumeStore` 트레이트로만 접근합니다. 운영에서는 SQLite 구현
//! (`db::SqliteStore`)을, 테스트에서는 메모리 목(mock)을 주입합니다.
//!
//! 세트 집계 규칙: 중량이 NULL이 아니고 0보다 크며 반복 횟수가 0보다 큰 세트만
//! "수행한 세트"로 봅니다. 볼륨, 1RM, 세트 수, 종목 수 모두 같은 규칙을 씁니다.

use crate::models::*;
use crate::services::numeric::{numeric_to_float, to_float};
use crate::services::one_rep_max::OneRepMaxFormula;
use crate::services::week::{format_week, recent_week_starts, week_start};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// `weeks_count`가 0 이하일 때 사용하는 기본 주 수
pub const DEFAULT_WEEKS_COUNT: i64 = 12;

/// 집계 엔진이 소비하는 저장소 경계.
///
/// 재시도는 이 계층의 책임이 아닙니다. 필요하면 구현체가 처리합니다.
#[async_trait]
pub trait VolumeStore: Send + Sync {
    /// `current_week`를 포함해 과거 `weeks_count`주 범위의 집계 행.
    /// 활동이 없는 주는 빠져 있을 수 있습니다.
    async fn fetch_recent_weekly_rows(
        &self,
        user_id: &str,
        current_week: NaiveDate,
        weeks_count: i64,
    ) -> Result<Vec<WeeklyVolumeRow>, sqlx::Error>;

    async fn fetch_week_row(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Option<WeeklyVolumeRow>, sqlx::Error>;

    /// 주 시작일이 `[start, end]`(양 끝 포함)에 들어가는 주들의 통계
    async fn fetch_stats_row(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeeklyVolumeStatsRow, sqlx::Error>;

    /// (사용자, 주) 하나의 집계를 현재 세트/워크아웃 데이터로 다시 만듭니다.
    async fn rebuild_week(&self, user_id: &str, week_start: NaiveDate) -> Result<(), sqlx::Error>;

    /// 모든 집계를 다시 만듭니다. "현재 주" 조회 직전에 호출됩니다.
    async fn refresh_all_aggregates(&self) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("aggregation failed in {operation} (user {user_id}, {scope})")]
    AggregationFailed {
        operation: &'static str,
        user_id: String,
        scope: String,
        #[source]
        source: sqlx::Error,
    },
}

impl VolumeError {
    fn aggregation(
        operation: &'static str,
        user_id: &str,
        scope: impl Into<String>,
        source: sqlx::Error,
    ) -> Self {
        let scope = scope.into();
        tracing::error!(operation, user_id, scope = %scope, error = %source, "Weekly volume store call failed");
        VolumeError::AggregationFailed {
            operation,
            user_id: user_id.to_string(),
            scope,
            source,
        }
    }
}

/// 세트가 볼륨 집계에 포함되는지 판단합니다.
fn performed_weight(set: &RawSetRow) -> Option<Decimal> {
    match set.weight_kg {
        Some(w) if w > Decimal::ZERO && set.reps > 0 => Some(w),
        _ => None,
    }
}

/// 한 주 분량의 원시 세트를 요약합니다.
///
/// 입력 순서와 무관하게 같은 집합이면 같은 결과를 냅니다.
/// 오버플로가 나는 세트는 경고 후 건너뜁니다.
pub fn summarize_week(sets: &[RawSetRow], formula: &dyn OneRepMaxFormula) -> WeeklyAggregate {
    let mut total_volume = Decimal::ZERO;
    let mut est_one_rm = Decimal::ZERO;
    let mut exercises: HashSet<&str> = HashSet::new();
    let mut set_count = 0i64;

    for set in sets {
        let Some(weight) = performed_weight(set) else {
            continue;
        };

        let volume = match weight
            .checked_mul(Decimal::from(set.reps))
            .and_then(|v| total_volume.checked_add(v))
        {
            Some(v) => v,
            None => {
                tracing::warn!(exercise_id = %set.exercise_id, weight = %weight, reps = set.reps, "Set volume overflowed, skipping set");
                continue;
            }
        };
        total_volume = volume;

        if let Some(estimate) = formula.estimate(weight, set.reps) {
            est_one_rm = est_one_rm.max(estimate);
        }
        exercises.insert(set.exercise_id.as_str());
        set_count += 1;
    }

    WeeklyAggregate {
        total_volume: total_volume.normalize(),
        est_one_rm: est_one_rm.normalize(),
        exercise_count: exercises.len() as i64,
        set_count,
    }
}

fn summary_from_row(row: &WeeklyVolumeRow) -> WeeklySummaryResponse {
    WeeklySummaryResponse {
        week: format_week(row.week_start_date),
        total_volume: to_float(row.total_volume.as_ref()),
        est_one_rm: to_float(row.est_one_rm.as_ref()),
        exercise_count: row.exercise_count,
        set_count: row.set_count,
    }
}

/// 집계 엔진. 요청마다 복제해서 써도 저장소 핸들만 공유됩니다.
#[derive(Clone)]
pub struct VolumeService {
    store: Arc<dyn VolumeStore>,
}

impl VolumeService {
    pub fn new(store: Arc<dyn VolumeStore>) -> Self {
        Self { store }
    }

    /// 최근 `weeks_count`주의 요약을 최신순으로 반환합니다. (0 이하 → 12주)
    pub async fn weekly_volumes(
        &self,
        user_id: &str,
        weeks_count: i64,
    ) -> Result<WeeklyVolumeSummaryResponse, VolumeError> {
        self.weekly_volumes_as_of(user_id, weeks_count, Utc::now()).await
    }

    /// `now` 기준으로 최근 `weeks_count`주의 요약을 만듭니다.
    ///
    /// 저장소가 돌려주지 않은 주는 0으로 채웁니다. 창 밖의 행이나 같은 주의
    /// 중복 행은 버리므로 결과 길이는 항상 `weeks_count`입니다.
    pub async fn weekly_volumes_as_of(
        &self,
        user_id: &str,
        weeks_count: i64,
        now: DateTime<Utc>,
    ) -> Result<WeeklyVolumeSummaryResponse, VolumeError> {
        let weeks_count = if weeks_count <= 0 {
            DEFAULT_WEEKS_COUNT
        } else {
            weeks_count
        };
        let current_week = week_start(now);

        let rows = self
            .store
            .fetch_recent_weekly_rows(user_id, current_week, weeks_count)
            .await
            .map_err(|e| {
                VolumeError::aggregation(
                    "weekly_volumes",
                    user_id,
                    format!("weeks_count {}", weeks_count),
                    e,
                )
            })?;

        // 저장소가 정렬되지 않은 날짜를 줘도 주 시작일로 다시 맞춥니다.
        let mut by_week: HashMap<NaiveDate, WeeklyVolumeRow> = HashMap::with_capacity(rows.len());
        for mut row in rows {
            let aligned = crate::services::week::week_start_date(row.week_start_date);
            row.week_start_date = aligned;
            if by_week.contains_key(&aligned) {
                tracing::warn!(user_id, week_start = %aligned, "Duplicate weekly row from store, keeping the first");
                continue;
            }
            by_week.insert(aligned, row);
        }

        let summaries = recent_week_starts(current_week, weeks_count as usize)
            .into_iter()
            .map(|week| match by_week.get(&week) {
                Some(row) => summary_from_row(row),
                None => summary_from_row(&WeeklyVolumeRow::zero(week)),
            })
            .collect();

        Ok(WeeklyVolumeSummaryResponse { summaries })
    }

    /// `at`이 속한 주의 요약. 데이터가 없으면 0 값 요약.
    pub async fn weekly_volume_for_week(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<WeeklySummaryResponse, VolumeError> {
        let week = week_start(at);
        let row = self
            .store
            .fetch_week_row(user_id, week)
            .await
            .map_err(|e| {
                VolumeError::aggregation("weekly_volume_for_week", user_id, format!("week {}", week), e)
            })?;

        Ok(summary_from_row(&row.unwrap_or_else(|| WeeklyVolumeRow::zero(week))))
    }

    /// 주 시작일이 `[start, end]`에 들어가는 주들의 통계.
    /// 대상 주가 없으면 모든 값이 0입니다.
    pub async fn weekly_volume_stats(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeeklyVolumeStatsResponse, VolumeError> {
        let stats = self
            .store
            .fetch_stats_row(user_id, start, end)
            .await
            .map_err(|e| {
                VolumeError::aggregation(
                    "weekly_volume_stats",
                    user_id,
                    format!("range {}..={}", start, end),
                    e,
                )
            })?;

        Ok(WeeklyVolumeStatsResponse {
            avg_weekly_volume: stats.avg_weekly_volume.unwrap_or(0.0),
            max_weekly_volume: numeric_to_float(&stats.max_weekly_volume, "max_weekly_volume"),
            min_weekly_volume: numeric_to_float(&stats.min_weekly_volume, "min_weekly_volume"),
            max_est_one_rm: numeric_to_float(&stats.max_est_one_rm, "max_est_1rm"),
            avg_exercise_count: stats.avg_exercise_count.unwrap_or(0.0),
            avg_set_count: stats.avg_set_count.unwrap_or(0.0),
        })
    }

    /// `at`이 속한 주의 집계를 다시 만듭니다.
    ///
    /// 새 값은 반환하지 않습니다. 호출자가 `weekly_volume_for_week`로 다시 읽습니다.
    pub async fn recalculate_weekly_volume(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), VolumeError> {
        let week = week_start(at);
        self.store.rebuild_week(user_id, week).await.map_err(|e| {
            VolumeError::aggregation("recalculate_weekly_volume", user_id, format!("week {}", week), e)
        })?;
        tracing::info!(user_id, week_start = %week, "Weekly volume recalculated");
        Ok(())
    }

    /// 모든 집계를 새로 고친 뒤 `now`가 속한 주의 요약을 읽습니다.
    pub async fn current_week_summary_as_of(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<WeeklySummaryResponse, VolumeError> {
        self.store.refresh_all_aggregates().await.map_err(|e| {
            VolumeError::aggregation("current_week_summary", user_id, "refresh all", e)
        })?;
        self.weekly_volume_for_week(user_id, now).await
    }
}
