//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! SQLite와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `menus`: 종목, 메뉴, 메뉴 항목 쿼리
//! - `workouts`: 워크아웃 생성/조회, 세트 수정 (주간 집계 재계산 포함)
//! - `volume`: `VolumeStore` 구현 (`weekly_volumes` 테이블)
//!
//! ## 저장 형식
//! - 시각: `2025-04-21T09:30:00.000Z` (UTC, 밀리초 고정). 문자열 비교가 시간 순서와 같습니다.
//! - 날짜: `2025-04-21`
//! - 십진수: 정규화된 TEXT (`rust_decimal::Decimal::to_string`)

pub mod menus;
pub mod volume;
pub mod workouts;

pub use menus::*;
pub use volume::SqliteStore;
pub use workouts::*;

use chrono::{DateTime, NaiveDate, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let a = format_timestamp(Utc.with_ymd_and_hms(2025, 4, 21, 9, 5, 0).unwrap());
        let b = format_timestamp(Utc.with_ymd_and_hms(2025, 4, 21, 10, 0, 0).unwrap());
        assert_eq!(a, "2025-04-21T09:05:00.000Z");
        assert!(a < b);
    }
}
