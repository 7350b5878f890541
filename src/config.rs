//! # 애플리케이션 설정(Configuration) 모듈
//!
//! `.env` 파일이나 시스템 환경변수에서 서버 설정값을 읽어옵니다.
//!
//! | 변수 | 필수 | 기본값 |
//! |---|---|---|
//! | `DATABASE_URL` | O | |
//! | `JWT_SECRET` | O | |
//! | `HOST` | | `0.0.0.0` |
//! | `PORT` | | `3000` |
//! | `DB_MAX_CONNECTIONS` | | `5` |
//! | `ONE_RM_FORMULA` | | `epley` (`brzycki` 가능) |
//! | `DEFAULT_WEEKS` | | `12` |

use std::env; // 환경변수 읽기 (std::env::var)

/// 서버 전체 설정값
///
/// `main`에서 한 번 만들고, 필요한 값만 `AppState`와 서비스에 나눠 줍니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/weekly_volume.db?mode=rwc")
    pub database_url: String,
    /// 외부 인증 서버와 공유하는 JWT 검증 키
    pub jwt_secret: String,
    /// 바인딩할 주소 (기본 "0.0.0.0": 모든 인터페이스)
    pub host: String,
    pub port: u16,
    /// SQLite 연결 풀 크기
    pub db_max_connections: u32,
    /// 추정 1RM 계산식 이름
    pub one_rm_formula: String,
    /// `weeks` 쿼리를 생략했을 때 보여줄 주 수
    pub default_weeks: i64,
}

impl Config {
    /// 필수 변수(`DATABASE_URL`, `JWT_SECRET`)가 없으면 에러.
    /// 나머지는 값이 없거나 파싱에 실패하면 기본값을 씁니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5),
            one_rm_formula: env::var("ONE_RM_FORMULA").unwrap_or_else(|_| "epley".to_string()),
            default_weeks: parse_or("DEFAULT_WEEKS", 12),
        })
    }
}

/// 값이 없거나 `T`로 파싱되지 않으면 `default`
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
