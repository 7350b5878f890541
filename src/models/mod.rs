//! # 데이터 모델 모듈
//!
//! 저장소 행(row)과 HTTP 요청/응답 구조체를 정의합니다.
//! - `exercise`: 종목과 최근 기록
//! - `menu`: 훈련 메뉴와 항목
//! - `workout`: 워크아웃
//! - `set`: 세트 기록
//! - `volume`: 주간 볼륨 집계 행과 요약 응답
//!
//! `crate::models::Menu`처럼 짧게 쓸 수 있도록 하위 모듈을 재공개합니다.

pub mod exercise;
pub mod menu;
pub mod set;
pub mod volume;
pub mod workout;

pub use exercise::*;
pub use menu::*;
pub use set::*;
pub use volume::*;
pub use workout::*;
