//! In-flight clinical measurements.

use std::ops::RangeInclusive;

use crate::error::CoreError;

const HEART_RATE: RangeInclusive<i32> = 20..=300;
const RESPIRATORY_RATE: RangeInclusive<i32> = 2..=80;
const SYSTOLIC_BP: RangeInclusive<i32> = 30..=300;
const DIASTOLIC_BP: RangeInclusive<i32> = 10..=200;
const TEMPERATURE_C: RangeInclusive<f64> = 25.0..=45.0;
const SPO2: RangeInclusive<i32> = 0..=100;
const GLASGOW: RangeInclusive<i32> = 3..=15;

/// One set of vital-sign measurements. Every field is optional: crews record
/// whatever they could measure at that moment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalSigns {
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<i32>,
    pub glasgow: Option<i32>,
}

impl VitalSigns {
    /// Reject empty readings and physiologically implausible values.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::Validation(
                "At least one vital sign must be recorded".into(),
            ));
        }

        check_range("heart_rate", self.heart_rate, &HEART_RATE)?;
        check_range("respiratory_rate", self.respiratory_rate, &RESPIRATORY_RATE)?;
        check_range("systolic_bp", self.systolic_bp, &SYSTOLIC_BP)?;
        check_range("diastolic_bp", self.diastolic_bp, &DIASTOLIC_BP)?;
        check_range("temperature_c", self.temperature_c, &TEMPERATURE_C)?;
        check_range("spo2", self.spo2, &SPO2)?;
        check_range("glasgow", self.glasgow, &GLASGOW)?;

        if let (Some(sys), Some(dia)) = (self.systolic_bp, self.diastolic_bp) {
            if dia >= sys {
                return Err(CoreError::Validation(format!(
                    "Diastolic pressure ({dia}) must be lower than systolic ({sys})"
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &VitalSigns::default()
    }

    /// Compact one-line summary for the tracking log, e.g.
    /// `"FC: 110, TA: 120/80, SpO2: 98"`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.heart_rate {
            parts.push(format!("FC: {v}"));
        }
        if let Some(v) = self.respiratory_rate {
            parts.push(format!("FR: {v}"));
        }
        match (self.systolic_bp, self.diastolic_bp) {
            (Some(s), Some(d)) => parts.push(format!("TA: {s}/{d}")),
            (Some(s), None) => parts.push(format!("TAS: {s}")),
            (None, Some(d)) => parts.push(format!("TAD: {d}")),
            (None, None) => {}
        }
        if let Some(v) = self.temperature_c {
            parts.push(format!("T: {v:.1}"));
        }
        if let Some(v) = self.spo2 {
            parts.push(format!("SpO2: {v}"));
        }
        if let Some(v) = self.glasgow {
            parts.push(format!("Glasgow: {v}"));
        }
        parts.join(", ")
    }
}

fn check_range<T>(field: &str, value: Option<T>, range: &RangeInclusive<T>) -> Result<(), CoreError>
where
    T: PartialOrd + std::fmt::Display,
{
    match value {
        Some(v) if !range.contains(&v) => Err(CoreError::Validation(format!(
            "{field} {v} is outside {}..={}",
            range.start(),
            range.end()
        ))),
        _ => Ok(()),
    }
}
