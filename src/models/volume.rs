//! # 주간 볼륨 모델
//!
//! 저장소 경계에서 주고받는 행(row) 타입과 HTTP 응답 DTO를 정의합니다.
//!
//! - `WeeklyVolumeRow`, `WeeklyVolumeStatsRow`, `RawSetRow`: 저장소 → 집계 엔진
//! - `WeeklySummaryResponse` 등: 집계 엔진 → HTTP 직렬화

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 저장소에서 느슨한 타입으로 도착하는 숫자 값.
///
/// SQLite 집계 함수(MAX, MIN 등)의 결과는 행마다 INTEGER, REAL, TEXT, NULL 중
/// 어느 것이든 될 수 있으므로, 하나의 구체 타입으로 가정하지 않고 태그로 구분합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValue {
    Null,
    Decimal(Decimal),
    Integer(i64),
    Float(f64),
    Text(String),
    /// 예상하지 못한 형태 (예: BLOB). 값은 저장 타입 이름.
    Unsupported(String),
}

/// `weekly_volumes` 테이블의 한 행: (사용자, 주 시작일) 단위 집계.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyVolumeRow {
    pub week_start_date: NaiveDate,
    pub total_volume: Option<Decimal>,
    pub est_one_rm: Option<Decimal>,
    pub exercise_count: i64,
    pub set_count: i64,
}

impl WeeklyVolumeRow {
    /// 활동이 없는 주를 위한 0 값 행
    pub fn zero(week_start_date: NaiveDate) -> Self {
        Self {
            week_start_date,
            total_volume: Some(Decimal::ZERO),
            est_one_rm: Some(Decimal::ZERO),
            exercise_count: 0,
            set_count: 0,
        }
    }
}

/// 기간 통계 쿼리의 결과 행.
///
/// 평균값은 SQLite `AVG()`가 REAL 또는 NULL(대상 주 없음)을 돌려주므로 `Option<f64>`,
/// 최대/최소값은 저장 형태가 일정하지 않으므로 `NumericValue`입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyVolumeStatsRow {
    pub avg_weekly_volume: Option<f64>,
    pub max_weekly_volume: NumericValue,
    pub min_weekly_volume: NumericValue,
    pub max_est_one_rm: NumericValue,
    pub avg_exercise_count: Option<f64>,
    pub avg_set_count: Option<f64>,
}

/// 집계 재계산에 쓰이는 원시 세트 한 줄 (세트 ⋈ 워크아웃)
#[derive(Debug, Clone, PartialEq)]
pub struct RawSetRow {
    pub exercise_id: String,
    /// None = 아직 수행하지 않은 세트
    pub weight_kg: Option<Decimal>,
    pub reps: i64,
}

/// 한 주 분량의 원시 세트를 요약한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyAggregate {
    pub total_volume: Decimal,
    pub est_one_rm: Decimal,
    pub exercise_count: i64,
    pub set_count: i64,
}

/// 주간 요약 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummaryResponse {
    /// 주 시작일 (RFC 3339, UTC 자정)
    pub week: String,
    pub total_volume: f64,
    #[serde(rename = "est_1rm")]
    pub est_one_rm: f64,
    pub exercise_count: i64,
    pub set_count: i64,
}

/// 최근 N주 목록 응답: 최신 주가 먼저 옵니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolumeSummaryResponse {
    pub summaries: Vec<WeeklySummaryResponse>,
}

/// 기간 통계 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolumeStatsResponse {
    pub avg_weekly_volume: f64,
    pub max_weekly_volume: f64,
    pub min_weekly_volume: f64,
    #[serde(rename = "max_est_1rm")]
    pub max_est_one_rm: f64,
    pub avg_exercise_count: f64,
    pub avg_set_count: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyVolumeQuery {
    /// 숫자가 아닌 값은 400으로 거절하기 위해 문자열로 받습니다.
    pub weeks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyVolumeStatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecalculateRequest {
    pub week: String,
}
