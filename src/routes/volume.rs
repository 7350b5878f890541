//! # 주간 볼륨 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/weekly-volume?weeks=N | `list_weekly_volumes` | 최근 N주 요약 (최신순, 빈 주는 0) |
//! | GET | /api/v1/weekly-volume/stats?start_date&end_date | `get_weekly_volume_stats` | 기간 통계 |
//! | GET | /api/v1/weekly-volume/{week} | `get_weekly_volume` | 특정 주 요약 |
//! | POST | /api/v1/weekly-volume/recalculate | `recalculate_weekly_volume` | 재계산 후 요약 반환 |
//! | GET | /api/v1/weekly-summary/current | `get_current_week_summary` | 전체 새로 고침 후 이번 주 요약 |
//!
//! 날짜 파라미터는 RFC 3339(`2025-04-23T10:00:00Z`) 또는 `YYYY-MM-DD`를 받습니다.
//! GET 요약 응답에는 `Cache-Control: max-age=900, stale-while-revalidate`가 붙습니다.

use crate::{
    error::AppError, middleware::auth::AuthUser, models::*, routes::AppState,
    services::week::is_supported,
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};

const SUMMARY_CACHE_CONTROL: &str = "max-age=900, stale-while-revalidate";

/// `weeks`의 상한 (약 10년)
pub const MAX_WEEKS: i64 = 520;

fn cached<T: serde::Serialize>(body: T) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, SUMMARY_CACHE_CONTROL)], Json(body))
}

/// RFC 3339 시각 또는 `YYYY-MM-DD` 날짜(UTC 자정)를 파싱합니다.
///
/// 파싱은 되지만 0001 ~ 9999년 밖에 있는 날짜(`-262143-01-01` 등)도 400입니다.
pub fn parse_timestamp_param(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    let at = match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Utc),
        Err(_) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
            .map_err(|_| {
                AppError::BadRequest(format!(
                    "{} must be an RFC 3339 timestamp or YYYY-MM-DD date",
                    field
                ))
            })?,
    };
    check_supported(at, field)
}

/// 주 단위 저장 범위(0001-01-01 ~ 9999-12-26) 밖이면 400
fn check_supported(at: DateTime<Utc>, field: &str) -> Result<DateTime<Utc>, AppError> {
    if !is_supported(at) {
        return Err(AppError::BadRequest(format!(
            "{} must fall between 0001-01-01 and 9999-12-26",
            field
        )));
    }
    Ok(at)
}

/// `weeks` 쿼리 파싱. 0 이하는 서비스에서 기본값으로 바뀝니다.
fn parse_weeks(raw: Option<&str>) -> Result<Option<i64>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let weeks: i64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest("weeks must be an integer".to_string()))?;
    if weeks > MAX_WEEKS {
        return Err(AppError::BadRequest(format!(
            "weeks must be {} or less",
            MAX_WEEKS
        )));
    }
    Ok(Some(weeks))
}

/// `GET /weekly-volume?weeks=N`
pub async fn list_weekly_volumes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WeeklyVolumeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let weeks = parse_weeks(query.weeks.as_deref())?;
    let summaries = state.summary.list_recent(&user.user_id, weeks).await?;
    Ok(cached(summaries))
}

/// `GET /weekly-volume/{week}`: `week`는 그 주 안의 아무 날짜나 가능
pub async fn get_weekly_volume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(week): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let at = parse_timestamp_param(&week, "week")?;
    let summary = state.summary.get_for_week(&user.user_id, at).await?;
    Ok(cached(summary))
}

/// `GET /weekly-volume/stats?start_date=..&end_date=..`
///
/// 생략하면 최근 3개월. 시작이 끝보다 늦으면 대상 주가 없으므로 0 값 통계.
pub async fn get_weekly_volume_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WeeklyVolumeStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let start = query
        .start_date
        .as_deref()
        .map(|s| parse_timestamp_param(s, "start_date"))
        .transpose()?;
    let end = query
        .end_date
        .as_deref()
        .map(|s| parse_timestamp_param(s, "end_date"))
        .transpose()?;

    let stats = state.summary.get_stats(&user.user_id, start, end).await?;
    Ok(cached(stats))
}

/// `POST /weekly-volume/recalculate` + `{ "week": "..." }`
pub async fn recalculate_weekly_volume(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RecalculateRequest>,
) -> Result<Json<WeeklySummaryResponse>, AppError> {
    let at = parse_timestamp_param(&req.week, "week")?;
    let summary = state.summary.recalculate(&user.user_id, at).await?;
    Ok(Json(summary))
}

/// `GET /weekly-summary/current`
pub async fn get_current_week_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.summary.current_week(&user.user_id).await?;
    Ok(cached(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::week::{format_week, week_start};
    use crate::test_utils::{
        bearer, seed_menu, seed_workout, send, setup_test_db, teardown_test_db, test_app,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeZone;

    fn get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, bearer(user));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_parse_timestamp_param_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 4, 23, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp_param("2025-04-23", "week").unwrap(), expected);
        assert_eq!(
            parse_timestamp_param("2025-04-23T09:00:00+09:00", "week").unwrap(),
            expected
        );
        assert!(matches!(
            parse_timestamp_param("23/04/2025", "week"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_param_rejects_years_outside_four_digits() {
        for raw in ["-262143-01-01", "0000-06-15", "+10000-01-01T00:00:00Z", "9999-12-30"] {
            assert!(
                matches!(parse_timestamp_param(raw, "week"), Err(AppError::BadRequest(_))),
                "{}",
                raw
            );
        }
        assert!(parse_timestamp_param("0001-01-01", "week").is_ok());
        assert!(parse_timestamp_param("9999-12-26T23:59:59Z", "week").is_ok());
    }

    #[test]
    fn test_parse_weeks() {
        assert_eq!(parse_weeks(None).unwrap(), None);
        assert_eq!(parse_weeks(Some("8")).unwrap(), Some(8));
        assert_eq!(parse_weeks(Some("-2")).unwrap(), Some(-2));
        assert!(parse_weeks(Some("eight")).is_err());
        assert!(parse_weeks(Some("521")).is_err());
    }

    #[tokio::test]
    async fn test_requests_without_token_are_rejected() {
        let pool = setup_test_db().await;
        let app = test_app(pool.clone());

        let (status, _, body) = send(&app, get("/api/v1/weekly-volume", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "missing_token");
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_list_defaults_to_twelve_zero_filled_weeks_with_cache_header() {
        let pool = setup_test_db().await;
        let app = test_app(pool.clone());

        let (status, headers, body) = send(&app, get("/api/v1/weekly-volume", Some("alice"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], SUMMARY_CACHE_CONTROL);
        let summaries = body["summaries"].as_array().unwrap();
        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0]["week"], format_week(week_start(Utc::now())));
        assert_eq!(summaries[0]["total_volume"], 0.0);
        assert_eq!(summaries[0]["est_1rm"], 0.0);
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_malformed_inputs_are_bad_requests() {
        let pool = setup_test_db().await;
        let app = test_app(pool.clone());

        for uri in [
            "/api/v1/weekly-volume?weeks=abc",
            "/api/v1/weekly-volume/not-a-date",
            "/api/v1/weekly-volume/stats?start_date=yesterday",
        ] {
            let (status, _, body) = send(&app, get(uri, Some("alice"))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"]["code"], "bad_request");
        }
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_out_of_range_weeks_are_bad_requests() {
        let pool = setup_test_db().await;
        let app = test_app(pool.clone());

        let (status, _, body) =
            send(&app, get("/api/v1/weekly-volume/-262143-01-01", Some("alice"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");

        let recalc = Request::builder()
            .method("POST")
            .uri("/api/v1/weekly-volume/recalculate")
            .header(header::AUTHORIZATION, bearer("alice"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"week":"9999-12-30"}"#))
            .unwrap();
        let (status, _, _) = send(&app, recalc).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_recalculate_returns_fresh_summary() {
        // Arrange
        let pool = setup_test_db().await;
        let menu = seed_menu(&pool, "alice").await;
        let day = Utc.with_ymd_and_hms(2025, 4, 23, 7, 0, 0).unwrap();
        seed_workout(&pool, "alice", &menu, day, &[("Squat", Some("100"), 5), ("Bench", Some("60"), 5)]).await;
        let app = test_app(pool.clone());
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/weekly-volume/recalculate")
            .header(header::AUTHORIZATION, bearer("alice"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"week":"2025-04-27"}"#))
            .unwrap();

        // Act
        let (status, _, body) = send(&app, request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["week"], "2025-04-21T00:00:00Z");
        assert_eq!(body["total_volume"], 800.0);
        assert_eq!(body["set_count"], 2);
        assert_eq!(body["exercise_count"], 2);

        let (_, _, week) = send(&app, get("/api/v1/weekly-volume/2025-04-21", Some("alice"))).await;
        assert_eq!(week["total_volume"], 800.0);
        let (_, _, other) = send(&app, get("/api/v1/weekly-volume/2025-04-21", Some("bob"))).await;
        assert_eq!(other["total_volume"], 0.0);
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_stats_for_empty_history_are_zero() {
        let pool = setup_test_db().await;
        let app = test_app(pool.clone());

        let (status, _, body) = send(
            &app,
            get(
                "/api/v1/weekly-volume/stats?start_date=2024-01-01&end_date=2024-03-31",
                Some("alice"),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        for field in [
            "avg_weekly_volume",
            "max_weekly_volume",
            "min_weekly_volume",
            "max_est_1rm",
            "avg_exercise_count",
            "avg_set_count",
        ] {
            assert_eq!(body[field], 0.0, "{}", field);
        }
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_current_week_refreshes_aggregates() {
        let pool = setup_test_db().await;
        let menu = seed_menu(&pool, "alice").await;
        seed_workout(&pool, "alice", &menu, Utc::now(), &[("Squat", Some("50"), 10)]).await;
        let app = test_app(pool.clone());

        let (status, _, body) =
            send(&app, get("/api/v1/weekly-summary/current", Some("alice"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_volume"], 500.0);
        assert_eq!(body["week"], format_week(week_start(Utc::now())));
        teardown_test_db(pool).await;
    }
}
