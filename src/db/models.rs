//! Database models
//!
//! Data structures representing database tables

use crate::core::error::{CanteenError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar date format used for enrollment windows
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Highest ISO week number
pub const MAX_WEEK: u32 = 53;

/// Student record in the database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub enrolled_from: String, // YYYY-MM-DD
    pub enrolled_to: String,   // YYYY-MM-DD
    pub created_on: String,    // RFC 3339
}

/// A student about to be inserted; the id is assigned by the store
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub enrolled_from: NaiveDate,
    pub enrolled_to: NaiveDate,
}

impl NewStudent {
    /// Parse and check an enrollment window.
    ///
    /// Fails when a date is not `YYYY-MM-DD` or the window is inverted.
    pub fn parse(name: &str, enrolled_from: &str, enrolled_to: &str) -> Result<Self> {
        let from = parse_date("enrolled_from", enrolled_from)?;
        let to = parse_date("enrolled_to", enrolled_to)?;

        if from > to {
            return Err(CanteenError::ValidationError(
                "enrolled_to must be greater than enrolled_from".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            enrolled_from: from,
            enrolled_to: to,
        })
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CanteenError::ValidationError(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

/// Admin record in the database
#[derive(Debug, Clone)]
pub struct Admin {
    pub username: String,
    pub password_hash: String,
}

/// Year and ISO week that key enlistments and menus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    /// Build a key, refusing week numbers outside 1..=53
    pub fn new(year: i32, week: u32) -> Result<Self> {
        if week == 0 || week > MAX_WEEK {
            return Err(CanteenError::ValidationError(format!(
                "week must be between 1 and {}",
                MAX_WEEK
            )));
        }
        Ok(Self { year, week })
    }
}

/// Which weekdays a student eats in a given week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
}

/// Enlistment record in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enlistment {
    pub id: i64,
    pub student_id: i64,
    pub key: WeekKey,
    pub days: MealDays,
    pub created_on: String,
}

/// Dishes served on each day of a week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDays {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
}

/// Menu record in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub id: i64,
    pub key: WeekKey,
    pub days: MenuDays,
    pub created_on: String,
}
