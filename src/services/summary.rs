//! # 주간 요약 서비스
//!
//! HTTP 핸들러가 호출하는 얇은 계층입니다. 집계 엔진(`VolumeService`) 위에서
//! 기본값(주 수, 통계 기간)을 채우고 "재계산 후 다시 읽기" 흐름을 묶습니다.

use crate::models::*;
use crate::services::volume::{VolumeError, VolumeService};
use chrono::{DateTime, Months, Utc};

#[derive(Clone)]
pub struct SummaryService {
    volume: VolumeService,
    default_weeks: i64,
}

impl SummaryService {
    pub fn new(volume: VolumeService, default_weeks: i64) -> Self {
        Self {
            volume,
            default_weeks,
        }
    }

    pub async fn list_recent(
        &self,
        user_id: &str,
        weeks: Option<i64>,
    ) -> Result<WeeklyVolumeSummaryResponse, VolumeError> {
        let weeks = weeks.unwrap_or(self.default_weeks);
        self.volume.weekly_volumes(user_id, weeks).await
    }

    pub async fn get_for_week(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<WeeklySummaryResponse, VolumeError> {
        self.volume.weekly_volume_for_week(user_id, at).await
    }

    /// 기간을 생략하면 최근 3개월(오늘 − 3개월 ~ 오늘)
    pub async fn get_stats(
        &self,
        user_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<WeeklyVolumeStatsResponse, VolumeError> {
        let (start, end) = stats_range(start, end, Utc::now());
        self.volume
            .weekly_volume_stats(user_id, start.date_naive(), end.date_naive())
            .await
    }

    /// 재계산 후 같은 주를 다시 읽어 반환합니다.
    pub async fn recalculate(
        &self,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> Result<WeeklySummaryResponse, VolumeError> {
        self.volume.recalculate_weekly_volume(user_id, at).await?;
        self.volume.weekly_volume_for_week(user_id, at).await
    }

    pub async fn current_week(&self, user_id: &str) -> Result<WeeklySummaryResponse, VolumeError> {
        self.volume.current_week_summary_as_of(user_id, Utc::now()).await
    }
}

fn stats_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end.unwrap_or(now);
    let start = start.unwrap_or_else(|| {
        now.checked_sub_months(Months::new(3)).unwrap_or(now)
    });
    (start, end)
}
