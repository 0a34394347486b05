use crate::core::error::Result;
use crate::db::models::{Enlistment, MealDays, WeekKey};
use serde::{Deserialize, Serialize};

/// Body of `POST` and `PATCH /student/enlistment`
#[derive(Debug, Default, Deserialize)]
pub struct EnlistmentRequest {
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub monday: Option<bool>,
    pub tuesday: Option<bool>,
    pub wednesday: Option<bool>,
    pub thursday: Option<bool>,
    pub friday: Option<bool>,
}

impl EnlistmentRequest {
    pub fn key(&self) -> Result<WeekKey> {
        super::common::week_key(self.year, self.week)
    }

    /// Days left out of the body count as not eating
    pub fn days(&self) -> MealDays {
        MealDays {
            monday: self.monday.unwrap_or(false),
            tuesday: self.tuesday.unwrap_or(false),
            wednesday: self.wednesday.unwrap_or(false),
            thursday: self.thursday.unwrap_or(false),
            friday: self.friday.unwrap_or(false),
        }
    }
}

/// An enlistment as returned to its owner (no student id)
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnlistmentResponse {
    pub id: i64,
    pub year: i32,
    pub week: u32,
    #[serde(flatten)]
    pub days: MealDays,
    pub created_on: String,
}

impl From<Enlistment> for EnlistmentResponse {
    fn from(enlistment: Enlistment) -> Self {
        Self {
            id: enlistment.id,
            year: enlistment.key.year,
            week: enlistment.key.week,
            days: enlistment.days,
            created_on: enlistment.created_on,
        }
    }
}
