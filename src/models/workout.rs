//! # 워크아웃 모델 정의
//!
//! 워크아웃은 한 사용자가 특정 메뉴로 시작한 훈련 한 번입니다.
//! 세트(`models::set`)를 소유하며, `started_at`이 속한 주의 볼륨 집계에 반영됩니다.

use crate::models::SetView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub menu_id: String,
    /// RFC 3339 (UTC, 밀리초)
    pub started_at: String,
    pub note: Option<String>,
    pub created_at: String,
}

/// 워크아웃 목록 항목: 메뉴 이름 포함
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkoutSummary {
    pub id: String,
    pub menu_id: String,
    pub menu_name: String,
    pub started_at: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutResponse {
    #[serde(flatten)]
    pub workout: Workout,
    pub sets: Vec<SetView>,
}

/// `POST /api/v1/workouts` 요청 본문
///
/// `exercises`를 생략하면 메뉴의 계획대로 빈 세트(중량 NULL)가 만들어지고,
/// 주면 기록된 세트가 그대로 저장됩니다.
#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub menu_id: String,
    pub note: Option<String>,
    /// 생략하면 서버 현재 시각
    pub started_at: Option<DateTime<Utc>>,
    pub exercises: Option<Vec<ExerciseSetsInput>>,
}

#[derive(Debug, Deserialize)]
pub struct ExerciseSetsInput {
    pub exercise_name: String,
    pub sets: Vec<SetInput>,
}

#[derive(Debug, Deserialize)]
pub struct SetInput {
    pub weight_kg: f64,
    pub reps: i64,
    pub rir: Option<f64>,
    pub rpe: Option<f64>,
}
