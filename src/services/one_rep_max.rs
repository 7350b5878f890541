//! # 추정 1RM 계산식
//!
//! 세트의 중량과 반복 횟수로 1회 최대 중량(1RM)을 추정합니다.
//! 계산식은 `OneRepMaxFormula` 트레이트 뒤에 숨겨져 있어 설정(`ONE_RM_FORMULA`)으로 교체할 수 있습니다.
//!
//! 결과는 소수점 4자리로 반올림합니다. 같은 입력이면 항상 같은 `Decimal`이 나오므로
//! 주간 집계를 다시 계산해도 값이 비트 단위로 동일합니다.

use rust_decimal::Decimal;
use std::fmt::Debug;
use std::sync::Arc;

/// 추정 1RM 결과의 소수 자릿수
pub const ONE_RM_SCALE: u32 = 4;

pub trait OneRepMaxFormula: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// 중량 `weight`(kg)로 `reps`회 수행한 세트의 추정 1RM.
    /// 수행하지 않은 세트(reps ≤ 0)나 계산할 수 없는 경우 None.
    fn estimate(&self, weight: Decimal, reps: i64) -> Option<Decimal>;
}

/// Epley: `w × (1 + r / 30)`
#[derive(Debug, Default, Clone, Copy)]
pub struct Epley;

impl OneRepMaxFormula for Epley {
    fn name(&self) -> &'static str {
        "epley"
    }

    fn estimate(&self, weight: Decimal, reps: i64) -> Option<Decimal> {
        if reps <= 0 {
            return None;
        }
        if reps == 1 {
            return Some(weight.round_dp(ONE_RM_SCALE));
        }
        let thirty = Decimal::from(30);
        weight
            .checked_mul(thirty.checked_add(Decimal::from(reps))?)?
            .checked_div(thirty)
            .map(|d| d.round_dp(ONE_RM_SCALE))
    }
}

/// Brzycki: `w × 36 / (37 − r)`. r ≥ 37에서는 정의되지 않으므로 Epley로 대체합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct Brzycki;

impl OneRepMaxFormula for Brzycki {
    fn name(&self) -> &'static str {
        "brzycki"
    }

    fn estimate(&self, weight: Decimal, reps: i64) -> Option<Decimal> {
        if reps <= 0 {
            return None;
        }
        if reps >= 37 {
            return Epley.estimate(weight, reps);
        }
        if reps == 1 {
            return Some(weight.round_dp(ONE_RM_SCALE));
        }
        weight
            .checked_mul(Decimal::from(36))?
            .checked_div(Decimal::from(37 - reps))
            .map(|d| d.round_dp(ONE_RM_SCALE))
    }
}

/// 설정 값(`epley`, `brzycki`)으로 계산식을 고릅니다. 대소문자 무시.
pub fn formula_by_name(name: &str) -> Option<Arc<dyn OneRepMaxFormula>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "epley" => Some(Arc::new(Epley)),
        "brzycki" => Some(Arc::new(Brzycki)),
        _ => None,
    }
}
