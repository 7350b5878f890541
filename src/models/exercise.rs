//! # 종목 모델 정의
//!
//! - `Exercise`: `exercises` 테이블 한 행 (이름은 전역 UNIQUE)
//! - `ExerciseLastRecord`: 메뉴 종목별로 가장 최근 워크아웃에서 기록한 세트

use crate::models::SetView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exercise {
    pub id: String,
    pub name: String,
}

/// `GET /menus/{id}/exercises/last-records` 응답 항목
///
/// 메뉴에 있는 종목 순서대로 하나씩 나옵니다. 그 메뉴로 한 워크아웃이 없거나
/// 최근 워크아웃에 그 종목 세트가 없으면 `sets`는 빈 배열입니다.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseLastRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    /// 최근 워크아웃의 `started_at`
    pub date: Option<String>,
    pub sets: Vec<SetView>,
}
