//! # 십진수 변환 헬퍼
//!
//! 저장소의 임의 정밀도 십진수(`rust_decimal::Decimal`)와 느슨한 타입의 숫자
//! (`NumericValue`)를 API 응답용 `f64`로 변환합니다.
//!
//! 주간 합계는 화면 표시용 best-effort 집계이므로, 변환 실패는 호출자에게
//! 에러로 올리지 않고 경고 로그를 남긴 뒤 0으로 처리합니다.

use crate::models::NumericValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// NULL 허용 십진수를 `f64`로 변환합니다. NULL이면 0.
///
/// `Decimal::to_f64()`는 가수(mantissa)와 스케일을 함께 적용하므로
/// `1234.56`은 `123456`이 아니라 `1234.56`이 됩니다.
pub fn to_float(value: Option<&Decimal>) -> f64 {
    match value {
        None => 0.0,
        Some(d) => d.to_f64().unwrap_or_else(|| {
            tracing::warn!(value = %d, "Decimal value could not be converted to f64, using 0");
            0.0
        }),
    }
}

/// 느슨한 타입의 숫자를 `f64`로 변환합니다.
///
/// `field`는 경고 로그에 남길 필드 이름입니다.
pub fn numeric_to_float(value: &NumericValue, field: &str) -> f64 {
    match value {
        NumericValue::Null => 0.0,
        NumericValue::Decimal(d) => to_float(Some(d)),
        NumericValue::Integer(i) => *i as f64,
        NumericValue::Float(f) if f.is_finite() => *f,
        NumericValue::Float(f) => {
            tracing::warn!(field, value = %f, "Non-finite numeric value, using 0");
            0.0
        }
        NumericValue::Text(s) => match Decimal::from_str(s.trim()) {
            Ok(d) => to_float(Some(&d)),
            Err(e) => {
                tracing::warn!(field, value = %s, error = %e, "Unparseable numeric text, using 0");
                0.0
            }
        },
        NumericValue::Unsupported(kind) => {
            tracing::warn!(field, kind = %kind, "Unexpected numeric shape, using 0");
            0.0
        }
    }
}

/// 저장소의 TEXT 십진수를 파싱합니다. 형식이 잘못된 값은 경고 후 None.
pub fn parse_decimal(raw: Option<&str>, field: &str) -> Option<Decimal> {
    let raw = raw?;
    match Decimal::from_str(raw.trim()) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(field, value = raw, error = %e, "Invalid decimal in store, treating as NULL");
            None
        }
    }
}

/// 요청 본문의 `f64`를 지정한 소수 자릿수의 `Decimal`로 변환합니다.
///
/// NaN/무한대는 None.
pub fn decimal_from_float(value: f64, scale: u32) -> Option<Decimal> {
    use rust_decimal::prelude::FromPrimitive;
    Decimal::from_f64(value).map(|d| d.round_dp(scale).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_applies_scale() {
        // 123456 × 10^-2: a scale-ignoring conversion would yield 123456
        let d = Decimal::new(123456, 2);
        assert!((to_float(Some(&d)) - 1234.56).abs() < 1e-9);

        let parsed = Decimal::from_str("1234.56").unwrap();
        assert!((to_float(Some(&parsed)) - 1234.56).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_domain_magnitudes() {
        for raw in ["0.0001", "2.5", "102.25", "99999.9999", "1234567890", "123456.7891"] {
            let d = Decimal::from_str(raw).unwrap();
            let expected: f64 = raw.parse().unwrap();
            assert!(
                (to_float(Some(&d)) - expected).abs() < 1e-9,
                "round trip failed for {}",
                raw
            );
        }
    }

    #[test]
    fn test_null_is_zero() {
        assert_eq!(to_float(None), 0.0);
        assert_eq!(numeric_to_float(&NumericValue::Null, "max_weekly_volume"), 0.0);
    }

    #[test]
    fn test_numeric_value_variants() {
        assert_eq!(numeric_to_float(&NumericValue::Integer(1200), "f"), 1200.0);
        assert_eq!(numeric_to_float(&NumericValue::Float(812.5), "f"), 812.5);
        assert_eq!(numeric_to_float(&NumericValue::Text("99.75".into()), "f"), 99.75);
        assert_eq!(
            numeric_to_float(&NumericValue::Decimal(Decimal::new(10005, 1)), "f"),
            1000.5
        );
    }

    #[test]
    fn test_unexpected_shapes_default_to_zero() {
        assert_eq!(numeric_to_float(&NumericValue::Text("heavy".into()), "f"), 0.0);
        assert_eq!(numeric_to_float(&NumericValue::Unsupported("BLOB".into()), "f"), 0.0);
        assert_eq!(numeric_to_float(&NumericValue::Float(f64::NAN), "f"), 0.0);
    }

    #[test]
    fn test_parse_decimal_tolerates_garbage() {
        assert_eq!(parse_decimal(Some("80.5"), "weight_kg"), Some(Decimal::new(805, 1)));
        assert_eq!(parse_decimal(Some("n/a"), "weight_kg"), None);
        assert_eq!(parse_decimal(None, "weight_kg"), None);
    }

    #[test]
    fn test_decimal_from_float_rounds_to_scale() {
        assert_eq!(decimal_from_float(82.5, 2), Some(Decimal::new(825, 1)));
        assert_eq!(decimal_from_float(0.1 + 0.2, 2), Some(Decimal::new(3, 1)));
        assert_eq!(decimal_from_float(f64::NAN, 2), None);
    }
}
