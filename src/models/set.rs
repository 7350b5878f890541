//! # 세트 모델 정의
//!
//! 중량, RIR, RPE는 십진수이므로 DB에는 정규화된 TEXT로 저장합니다.
//! `SetRecord`는 저장 형태 그대로, `SetView`는 응답용으로 숫자로 변환한 형태입니다.

use crate::services::numeric::{parse_decimal, to_float};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SetRecord {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub set_order: i64,
    pub weight_kg: Option<String>,
    pub reps: i64,
    pub rir: Option<String>,
    pub rpe: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetView {
    pub id: String,
    pub workout_id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub set_order: i64,
    /// None = 아직 수행하지 않은 세트
    pub weight_kg: Option<f64>,
    pub reps: i64,
    pub rir: Option<f64>,
    pub rpe: Option<f64>,
    pub updated_at: String,
}

impl From<SetRecord> for SetView {
    fn from(r: SetRecord) -> Self {
        let decimal = |raw: Option<&str>, field: &str| {
            parse_decimal(raw, field).map(|d| to_float(Some(&d)))
        };
        Self {
            weight_kg: decimal(r.weight_kg.as_deref(), "weight_kg"),
            rir: decimal(r.rir.as_deref(), "rir"),
            rpe: decimal(r.rpe.as_deref(), "rpe"),
            id: r.id,
            workout_id: r.workout_id,
            exercise_id: r.exercise_id,
            exercise_name: r.exercise_name,
            set_order: r.set_order,
            reps: r.reps,
            updated_at: r.updated_at,
        }
    }
}

/// `PATCH /api/v1/sets/{id}`: 보낸 필드만 바뀝니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSetRequest {
    pub weight_kg: Option<f64>,
    pub reps: Option<i64>,
    pub rir: Option<f64>,
    pub rpe: Option<f64>,
}
