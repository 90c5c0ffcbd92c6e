//! Patient age derived from birth date.
//!
//! Ages are stored broken down because neonatal and paediatric transports
//! are dosed by months/days, not years. The breakdown uses fixed 365-day
//! years and 30-day months:
//!
//! - under 365 days: `{ years: 0, months: days / 30, days: days % 30 }`
//! - otherwise: `{ years: days / 365, months: (days % 365) / 30, days: 0 }`

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;

/// Age at a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatientAge {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

/// Compute the age of someone born on `birth_date` as of `reference`.
///
/// Rejects birth dates after the reference date.
pub fn compute_age(birth_date: NaiveDate, reference: NaiveDate) -> Result<PatientAge, CoreError> {
    let total_days = (reference - birth_date).num_days();
    if total_days < 0 {
        return Err(CoreError::Validation(format!(
            "Birth date {birth_date} is in the future"
        )));
    }

    let age = if total_days < DAYS_PER_YEAR {
        PatientAge {
            years: 0,
            months: (total_days / DAYS_PER_MONTH) as i32,
            days: (total_days % DAYS_PER_MONTH) as i32,
        }
    } else {
        PatientAge {
            years: (total_days / DAYS_PER_YEAR) as i32,
            months: ((total_days % DAYS_PER_YEAR) / DAYS_PER_MONTH) as i32,
            days: 0,
        }
    };
    Ok(age)
}
