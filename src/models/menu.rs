//! # 메뉴 모델 정의
//!
//! 훈련 메뉴(Menu)는 종목과 계획 세트/반복 수의 목록입니다.
//! 워크아웃을 시작하면 메뉴 항목으로부터 세트가 만들어집니다.
//!
//! ## 구조체 역할
//! - `Menu`: `menus` 테이블 한 행
//! - `MenuItemView`: 종목 이름이 포함된 메뉴 항목 (응답용)
//! - `MenuResponse`: 메뉴 + 항목 목록
//! - `CreateMenuRequest`, `MenuItemInput`: `POST /api/v1/menus`, `PUT /api/v1/menus/{id}` 요청 본문
//!   (수정은 이름, 설명, 항목 전체를 바꿉니다)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Menu {
    pub id: String,
    /// 메뉴 소유자 (JWT `sub`)
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// 메뉴 항목: `menu_items` ⋈ `exercises`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItemView {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub set_order: i64,
    pub planned_sets: i64,
    pub planned_reps: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuResponse {
    #[serde(flatten)]
    pub menu: Menu,
    pub items: Vec<MenuItemView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<MenuItemInput>,
}

/// 종목은 이름으로 지정합니다. 없는 종목이면 새로 만듭니다.
#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    pub exercise_name: String,
    pub set_order: i64,
    /// 생략하면 1세트
    pub planned_sets: Option<i64>,
    /// 생략하면 0회
    pub planned_reps: Option<i64>,
}
