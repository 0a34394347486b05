use crate::core::error::Result;
use crate::db::models::{Menu, MenuDays, WeekKey};
use serde::{Deserialize, Serialize};

/// Body of `POST /menu`
#[derive(Debug, Default, Deserialize)]
pub struct MenuRequest {
    pub year: Option<i32>,
    pub week: Option<u32>,
    #[serde(flatten)]
    pub days: MenuDays,
}

impl MenuRequest {
    pub fn key(&self) -> Result<WeekKey> {
        super::common::week_key(self.year, self.week)
    }
}

/// Response for menu lookups
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuResponse {
    pub id: i64,
    pub year: i32,
    pub week: u32,
    #[serde(flatten)]
    pub days: MenuDays,
    pub created_on: String,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            year: menu.key.year,
            week: menu.key.week,
            days: menu.days,
            created_on: menu.created_on,
        }
    }
}
