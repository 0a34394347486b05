use crate::core::error::{CanteenError, Result};
use crate::db::models::WeekKey;
use serde::Deserialize;

/// `?year=&week=` selecting one week
#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
}

impl WeekQuery {
    pub fn key(&self) -> Result<WeekKey> {
        week_key(self.year, self.week)
    }
}

/// Both parts present and the week in range
pub fn week_key(year: Option<i32>, week: Option<u32>) -> Result<WeekKey> {
    match (year, week) {
        (Some(year), Some(week)) => WeekKey::new(year, week),
        _ => Err(CanteenError::InvalidRequest(
            "year and week are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_query_requires_both_parts() {
        let query = WeekQuery {
            year: Some(2024),
            week: None,
        };
        assert!(matches!(query.key(), Err(CanteenError::InvalidRequest(_))));

        let query = WeekQuery {
            year: Some(2024),
            week: Some(7),
        };
        assert_eq!(query.key().unwrap(), WeekKey { year: 2024, week: 7 });
    }

    #[test]
    fn test_week_query_range_checked() {
        assert!(matches!(
            week_key(Some(2024), Some(60)),
            Err(CanteenError::ValidationError(_))
        ));
    }
}
