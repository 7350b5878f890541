//! # 주(週) 정렬 유틸리티
//!
//! 임의의 시각을 그 시각이 속한 주의 시작일(월요일, UTC 자정)로 정규화합니다.
//! 집계 엔진과 재계산 트리거가 모두 이 모듈을 사용하므로,
//! 어느 경로에서 계산하든 "같은 주"는 항상 같은 키로 해석됩니다.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// 주어진 날짜가 속한 주의 월요일을 반환합니다.
///
/// 일요일은 6일 전 월요일로, 나머지 요일은 (요일 번호 − 1)일을 뺀 날짜로 이동합니다.
/// 월요일이 chrono 표현 범위 밖이면 `NaiveDate::MIN`으로 고정됩니다.
pub fn week_start_date(date: NaiveDate) -> NaiveDate {
    // num_days_from_monday(): 월=0, 화=1, ..., 일=6
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN)
}

/// 다음 주 월요일. 표현 범위를 넘으면 `None`.
pub fn next_week_start(week: NaiveDate) -> Option<NaiveDate> {
    week_start_date(week).checked_add_days(Days::new(7))
}

/// 주 전체가 4자리 연도(0001 ~ 9999) 안에 들어가는지 확인합니다.
///
/// 저장 형식은 고정 폭 문자열이라 문자열 비교가 시간 순서와 같아야 합니다.
/// 9999-12-27 주는 다음 주 월요일이 10000년이라 받지 않습니다.
pub fn is_supported(at: DateTime<Utc>) -> bool {
    let date = at.date_naive();
    date.year() >= 1 && next_week_start(date).is_some_and(|end| end.year() <= 9999)
}

/// 주어진 시각(UTC)이 속한 주의 월요일 날짜를 반환합니다.
///
/// 시각(time-of-day)은 버립니다. 호출하는 쪽에서 이미 UTC로 정규화했다고 가정합니다.
pub fn week_start(at: DateTime<Utc>) -> NaiveDate {
    week_start_date(at.date_naive())
}

/// 주 시작일을 UTC 자정 시각으로 되돌립니다.
pub fn week_start_at_midnight(week: NaiveDate) -> DateTime<Utc> {
    week.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `current_week`부터 과거로 `weeks_count`개의 주 시작일을 최신순으로 나열합니다.
pub fn recent_week_starts(current_week: NaiveDate, weeks_count: usize) -> Vec<NaiveDate> {
    let current_week = week_start_date(current_week);
    (0..weeks_count as u64)
        .map_while(|i| current_week.checked_sub_days(Days::new(i * 7)))
        .collect()
}

/// 응답용 주 표기. RFC 3339, UTC 자정 (예: `2025-04-21T00:00:00Z`).
pub fn format_week(week: NaiveDate) -> String {
    week_start_at_midnight(week)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
